// 🔁 Substitution tables - normalization rules as data
// Four static dictionaries consulted by the normalizer. Declaration order is
// match order for the first-match-only passes, so these are association
// lists, not maps.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The four substitution dictionaries:
///
/// - `numeric_brands`: substring containing digits → brand
///   (consulted before digit-token stripping would destroy the key);
/// - `brand_abbreviations`: punctuated abbreviation → brand
///   (consulted before service-character stripping);
/// - `slash_products`: slash pattern → product;
/// - `synonyms`: token → canonical token (whole-token replacement).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionTables {
    pub numeric_brands: Vec<(String, String)>,
    pub brand_abbreviations: Vec<(String, String)>,
    pub slash_products: Vec<(String, String)>,
    pub synonyms: Vec<(String, String)>,
}

impl SubstitutionTables {
    /// Built-in defaults. Deployments with a curated dictionary override
    /// these via [`SubstitutionTables::from_file`].
    pub fn builtin() -> Self {
        let pairs = |entries: &[(&str, &str)]| {
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>()
        };

        SubstitutionTables {
            numeric_brands: pairs(&[
                ("7up", "7up"),
                ("j7", "j7"),
                ("5 озер", "пять озер"),
                ("100% gold", "100% gold"),
            ]),
            brand_abbreviations: pairs(&[
                ("mr.ricco", "mr.ricco"),
                ("dr.pepper", "dr.pepper"),
                ("т.м.красная цена", "красная цена"),
            ]),
            slash_products: pairs(&[
                ("т/б", "туалетная бумага"),
                ("ж/р", "жевательная резинка"),
                ("п/ф", "полуфабрикаты"),
            ]),
            synonyms: pairs(&[
                ("майон", "майонез"),
                ("шок", "шоколад"),
                ("гов", "говядина"),
                ("молок", "молоко"),
            ]),
        }
    }

    /// Load tables from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read substitution tables: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse substitution tables: {}", path.display()))
    }
}

impl Default for SubstitutionTables {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_nonempty() {
        let tables = SubstitutionTables::builtin();
        assert!(!tables.numeric_brands.is_empty());
        assert!(!tables.brand_abbreviations.is_empty());
        assert!(!tables.slash_products.is_empty());
        assert!(!tables.synonyms.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let tables = SubstitutionTables::builtin();
        let json = serde_json::to_string(&tables).unwrap();
        let parsed: SubstitutionTables = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.slash_products, tables.slash_products);
        assert_eq!(parsed.numeric_brands[0].0, "7up");
    }
}
