// Brand resolution against the Russian brand lexicon.

use std::sync::Arc;

use crate::catalog::CatalogSet;
use crate::resolve::{cut_phrase, token_combinations};

/// A successful brand match: the brand, and the working text with every
/// occurrence of the matched entry cut out.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandResolution {
    pub name: String,
    pub brand: String,
}

/// Matches the Russian brand lexicon against single tokens and 2-token
/// combinations of the working text. Lexicon order is the tie-break: the
/// first entry found wins.
pub struct BrandResolver {
    catalogs: Arc<CatalogSet>,
}

impl BrandResolver {
    pub fn new(catalogs: Arc<CatalogSet>) -> Self {
        BrandResolver { catalogs }
    }

    /// No-op when the brand is already known or the text is empty.
    pub fn resolve(&self, name: &str, brand_known: bool) -> Option<BrandResolution> {
        if brand_known || name.is_empty() {
            return None;
        }

        let candidates = token_combinations(name);
        for entry in self.catalogs.rus_brands.iter() {
            if candidates.contains(entry) {
                return Some(BrandResolution {
                    name: cut_phrase(name, entry),
                    brand: entry.to_string(),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Blacklist, BrandLexicon, HistoryTable, ProductCatalog};

    fn catalogs(brands: &[&str]) -> Arc<CatalogSet> {
        Arc::new(CatalogSet {
            rus_brands: BrandLexicon::from_entries(brands.iter().map(|s| s.to_string()).collect()),
            en_brands: BrandLexicon::from_entries(vec![]),
            products: ProductCatalog::from_rows(vec![]),
            history: HistoryTable::from_rows(vec![]),
            blacklist: Blacklist::default(),
        })
    }

    #[test]
    fn test_single_token_match_removed_from_name() {
        let resolver = BrandResolver::new(catalogs(&["простоквашино"]));
        let res = resolver.resolve("молоко простоквашино отборное", false).unwrap();
        assert_eq!(res.brand, "простоквашино");
        assert_eq!(res.name, "молоко отборное");
    }

    #[test]
    fn test_two_token_combination_match() {
        let resolver = BrandResolver::new(catalogs(&["домик в деревне", "красная цена"]));
        let res = resolver.resolve("молоко красная цена", false).unwrap();
        assert_eq!(res.brand, "красная цена");
        assert_eq!(res.name, "молоко");
    }

    #[test]
    fn test_lexicon_order_breaks_ties() {
        // Both entries are present; the earlier lexicon entry wins.
        let resolver = BrandResolver::new(catalogs(&["агуша", "тема"]));
        let res = resolver.resolve("творожок тема агуша", false).unwrap();
        assert_eq!(res.brand, "агуша");
    }

    #[test]
    fn test_noop_when_brand_known_or_empty() {
        let resolver = BrandResolver::new(catalogs(&["агуша"]));
        assert!(resolver.resolve("творожок агуша", true).is_none());
        assert!(resolver.resolve("", false).is_none());
    }

    #[test]
    fn test_no_match_returns_none() {
        let resolver = BrandResolver::new(catalogs(&["агуша"]));
        assert!(resolver.resolve("хлеб дарницкий", false).is_none());
    }
}
