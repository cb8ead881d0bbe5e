// Product resolution against the product catalog, with multi-match
// reduction and the ambiguous-votes classifier escape hatch.

use std::sync::Arc;

use crate::catalog::CatalogSet;
use crate::classifier::CategoryModel;
use crate::record::Category;
use crate::resolve::token_combinations;

/// A successful product match. The working text is left untouched; only
/// brand resolution consumes text.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductResolution {
    /// Surviving matched phrases, comma-joined.
    pub product: String,
    pub category: Category,
}

/// Matches catalog product phrases against single tokens and 2-token
/// combinations of the working text.
///
/// When several catalog entries match, single-word matches subsumed by a
/// multi-word match are dropped, the survivors are comma-joined, and the
/// category is delegated to the classifier (the rows would otherwise vote
/// ambiguously). A unique match takes its catalog category directly.
pub struct ProductResolver {
    catalogs: Arc<CatalogSet>,
    model: Arc<dyn CategoryModel>,
}

impl ProductResolver {
    pub fn new(catalogs: Arc<CatalogSet>, model: Arc<dyn CategoryModel>) -> Self {
        ProductResolver { catalogs, model }
    }

    /// No-op when the product is already known or the text is empty.
    pub fn resolve(&self, name: &str, product_known: bool) -> Option<ProductResolution> {
        if product_known || name.is_empty() {
            return None;
        }

        let candidates = token_combinations(name);
        let matches = self.catalogs.products.matches(&candidates);
        if matches.is_empty() {
            return None;
        }

        let category = if matches.len() == 1 {
            matches[0].1
        } else {
            self.model.predict(name)
        };

        let phrases: Vec<&str> = matches.iter().map(|(p, _)| *p).collect();
        let product = reduce_matches(phrases).join(", ");

        Some(ProductResolution { product, category })
    }
}

/// Drop single-word matches that are contained in some multi-word match:
/// ["вода", "вода питьевая"] → ["вода питьевая"]. When every match is a
/// single word the list is returned as-is, in catalog order; otherwise the
/// survivors are ordered by word count (stable within equal counts).
fn reduce_matches(phrases: Vec<&str>) -> Vec<&str> {
    let has_multi = phrases.iter().any(|p| p.split_whitespace().count() > 1);
    if !has_multi {
        return phrases;
    }

    let mut ordered = phrases;
    ordered.sort_by_key(|p| p.split_whitespace().count());

    let multi: Vec<&str> = ordered
        .iter()
        .copied()
        .filter(|p| p.split_whitespace().count() > 1)
        .collect();

    ordered.retain(|p| {
        p.split_whitespace().count() > 1 || !multi.iter().any(|m| m.contains(p))
    });
    ordered
}
