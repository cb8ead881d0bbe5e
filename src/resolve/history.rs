// Brand-history fallback: when a brand is known but no product could be
// matched, assign the plurality product and category among the brand's
// historical rows. Product and category are voted independently.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::catalog::CatalogSet;
use crate::record::Category;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryResolution {
    pub product: String,
    pub category: Category,
}

pub struct BrandHistoryResolver {
    catalogs: Arc<CatalogSet>,
}

impl BrandHistoryResolver {
    pub fn new(catalogs: Arc<CatalogSet>) -> Self {
        BrandHistoryResolver { catalogs }
    }

    /// No-op when a product is already known, no brand is known, or the
    /// brand has no history.
    pub fn resolve(&self, brand: Option<&str>, product_known: bool) -> Option<HistoryResolution> {
        if product_known {
            return None;
        }
        let brand = brand?;

        let rows = self.catalogs.history.rows_for_brand(brand);
        if rows.is_empty() {
            return None;
        }

        let product = plurality(rows.iter().map(|r| r.product.as_str()))?.to_string();
        let category = plurality(rows.iter().map(|r| r.category))?;

        Some(HistoryResolution { product, category })
    }
}

/// Most frequent value; ties resolve to the value first encountered at the
/// peak frequency.
fn plurality<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash + Copy,
    I: Iterator<Item = T>,
{
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (idx, value) in values.enumerate() {
        let entry = counts.entry(value).or_insert((0, idx));
        entry.0 += 1;
    }

    counts
        .into_iter()
        .min_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)))
        .map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Blacklist, BrandLexicon, HistoryRow, HistoryTable, ProductCatalog};

    fn resolver(rows: Vec<(&str, &str, Category)>) -> BrandHistoryResolver {
        BrandHistoryResolver::new(Arc::new(CatalogSet {
            rus_brands: BrandLexicon::from_entries(vec![]),
            en_brands: BrandLexicon::from_entries(vec![]),
            products: ProductCatalog::from_rows(vec![]),
            history: HistoryTable::from_rows(
                rows.into_iter()
                    .map(|(b, p, c)| HistoryRow {
                        brand: b.to_string(),
                        product: p.to_string(),
                        category: c,
                    })
                    .collect(),
            ),
            blacklist: Blacklist::default(),
        }))
    }

    #[test]
    fn test_plurality_product_and_category() {
        let r = resolver(vec![
            ("агуша", "творожок", Category::Dairy),
            ("агуша", "сок", Category::Beverages),
            ("агуша", "творожок", Category::Dairy),
        ]);
        let res = r.resolve(Some("агуша"), false).unwrap();
        assert_eq!(res.product, "творожок");
        assert_eq!(res.category, Category::Dairy);
    }

    #[test]
    fn test_votes_are_independent() {
        // The modal product and the modal category come from different rows.
        let r = resolver(vec![
            ("агуша", "творожок", Category::MotherAndChild),
            ("агуша", "творожок", Category::Dairy),
            ("агуша", "сок", Category::Dairy),
            ("агуша", "пюре", Category::Dairy),
        ]);
        let res = r.resolve(Some("агуша"), false).unwrap();
        assert_eq!(res.product, "творожок");
        assert_eq!(res.category, Category::Dairy);
    }

    #[test]
    fn test_tie_resolves_to_first_encountered() {
        let r = resolver(vec![
            ("агуша", "сок", Category::Beverages),
            ("агуша", "творожок", Category::Dairy),
        ]);
        let res = r.resolve(Some("агуша"), false).unwrap();
        assert_eq!(res.product, "сок");
        assert_eq!(res.category, Category::Beverages);
    }

    #[test]
    fn test_noop_cases() {
        let r = resolver(vec![("агуша", "сок", Category::Beverages)]);
        assert!(r.resolve(None, false).is_none());
        assert!(r.resolve(Some("агуша"), true).is_none());
        assert!(r.resolve(Some("неизвестный"), false).is_none());
    }
}
