// 🧹 Normalizer - ordered text-cleanup chain
// Converts a raw receipt description into the normalized working string and
// pre-fills brand/product when a substitution table recognizes one. Step
// order is load-bearing: dictionary keys must be consulted before the pass
// that would destroy them (digit stripping, service-character removal), and
// every step is a no-op on its own output so retries can safely re-enter
// parts of the chain.

use std::collections::HashMap;

use crate::catalog::{Blacklist, BrandLexicon};
use crate::record::ProductRecord;
use crate::substitutions::SubstitutionTables;

/// Characters stripped by the punctuation pass, kept as data so the rule is
/// testable in isolation.
const SERVICE_CHARS: &str = ".,+!?%:№*/()|";

/// Tokens this short carry no signal on receipts (units, prepositions,
/// chopped abbreviations).
const MIN_TOKEN_CHARS: usize = 3;

/// The ordered transform chain of the cleanup stage.
///
/// Steps, in order:
/// 1. lowercase;
/// 2. numeric-brand extraction, then digit-token stripping;
/// 3. abbreviation/slash-pattern extraction, then service-character removal;
/// 4. short-token removal;
/// 5. English-brand extraction;
/// 6. blacklist filtering;
/// 7. token synonym substitution;
/// 8. residual-Latin extraction.
#[derive(Debug, Clone)]
pub struct Normalizer {
    tables: SubstitutionTables,
    en_brands: BrandLexicon,
    blacklist: Blacklist,
    synonym_map: HashMap<String, String>,
}

impl Normalizer {
    pub fn new(tables: SubstitutionTables, en_brands: BrandLexicon, blacklist: Blacklist) -> Self {
        let synonym_map = tables
            .synonyms
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Normalizer {
            tables,
            en_brands,
            blacklist,
            synonym_map,
        }
    }

    /// Run the full chain on one raw description.
    pub fn normalize(&self, raw: &str) -> ProductRecord {
        let mut record = ProductRecord::new(raw);

        let text = raw.to_lowercase();

        let (text, numeric_brand) = extract_numeric_brand(&text, &self.tables.numeric_brands);
        let text = strip_digit_tokens(&text);

        let (text, abbrev_brand) = extract_brand_abbreviation(&text, &self.tables.brand_abbreviations);
        let (text, slash_product) = extract_slash_product(&text, &self.tables.slash_products);
        let text = strip_service_chars(&text);

        let text = drop_short_tokens(&text);

        let mut brand = numeric_brand.or(abbrev_brand);
        let (text, en_brand) = extract_en_brand(&text, brand.is_some(), &self.en_brands);
        brand = brand.or(en_brand);

        let text = drop_blacklisted(&text, &self.blacklist);
        let text = apply_synonyms(&text, &self.synonym_map);

        let (text, latin_brand) = extract_latin_residue(&text, brand.is_some());
        brand = brand.or(latin_brand);

        record.name_norm = text;
        record.fill_brand(brand);
        record.fill_product(slash_product);
        record
    }
}

// ============================================================================
// CHAIN STEPS
// ============================================================================

/// Step 2a: first numeric-brand key found in the text names the brand and is
/// cut out before digit stripping can destroy it.
fn extract_numeric_brand(text: &str, table: &[(String, String)]) -> (String, Option<String>) {
    for (key, brand) in table {
        if text.contains(key.as_str()) {
            return (remove_all(text, key), Some(brand.clone()));
        }
    }
    (text.to_string(), None)
}

/// Step 2b: drop every whitespace-delimited token that contains a digit
/// (weights, volumes, percentages, article codes).
fn strip_digit_tokens(text: &str) -> String {
    join_tokens(
        text.split_whitespace()
            .filter(|t| !t.chars().any(|c| c.is_ascii_digit())),
    )
}

/// Step 3a: first abbreviation key found names the brand, first match only.
fn extract_brand_abbreviation(text: &str, table: &[(String, String)]) -> (String, Option<String>) {
    for (key, brand) in table {
        if text.contains(key.as_str()) {
            return (remove_all(text, key), Some(brand.clone()));
        }
    }
    (text.to_string(), None)
}

/// Step 3b: first slash-pattern key found names the product; the key is
/// replaced by a space so its neighbours stay separate tokens.
fn extract_slash_product(text: &str, table: &[(String, String)]) -> (String, Option<String>) {
    for (key, product) in table {
        if text.contains(key.as_str()) {
            return (join_tokens(text.replace(key.as_str(), " ").split_whitespace()),
                    Some(product.clone()));
        }
    }
    (text.to_string(), None)
}

/// Step 3c: remove service characters and trailing hyphens attached to a
/// word. Infix hyphens between word characters survive; the orchestrator's
/// de-hyphenation retry handles those later.
fn strip_service_chars(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if SERVICE_CHARS.contains(c) { ' ' } else { c })
        .collect();

    join_tokens(cleaned.split_whitespace().map(|token| {
        if token.chars().any(|c| c != '-') {
            token.trim_end_matches('-')
        } else {
            token
        }
    }))
}

/// Step 4: remove tokens shorter than [`MIN_TOKEN_CHARS`] characters.
fn drop_short_tokens(text: &str) -> String {
    join_tokens(
        text.split_whitespace()
            .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS),
    )
}

/// Step 5: first English-lexicon entry found as a substring names the brand
/// and every occurrence is cut out of the text. Skipped entirely when a
/// brand is already known.
fn extract_en_brand(text: &str, brand_known: bool, lexicon: &BrandLexicon) -> (String, Option<String>) {
    if brand_known {
        return (text.to_string(), None);
    }
    for entry in lexicon.iter() {
        if text.contains(entry) {
            return (remove_all(text, entry), Some(entry.to_string()));
        }
    }
    (text.to_string(), None)
}

/// Step 6: remove blacklisted tokens.
fn drop_blacklisted(text: &str, blacklist: &Blacklist) -> String {
    join_tokens(text.split_whitespace().filter(|t| !blacklist.contains(t)))
}

/// Step 7: whole-token synonym substitution; unmatched tokens pass through.
fn apply_synonyms(text: &str, synonyms: &HashMap<String, String>) -> String {
    join_tokens(
        text.split_whitespace()
            .map(|t| synonyms.get(t).map(|s| s.as_str()).unwrap_or(t)),
    )
}

/// Step 8: strip every remaining all-Latin token; when a brand is still
/// missing, the stripped tokens joined by single spaces become the brand.
fn extract_latin_residue(text: &str, brand_known: bool) -> (String, Option<String>) {
    let (latin, rest): (Vec<&str>, Vec<&str>) = text
        .split_whitespace()
        .partition(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_lowercase()));

    let brand = if !brand_known && !latin.is_empty() {
        Some(latin.join(" "))
    } else {
        None
    };
    (join_tokens(rest.into_iter()), brand)
}

/// Remove every occurrence of `needle` and re-normalize whitespace.
fn remove_all(text: &str, needle: &str) -> String {
    join_tokens(text.replace(needle, " ").split_whitespace())
}

fn join_tokens<'a, I: Iterator<Item = &'a str>>(tokens: I) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substitutions::SubstitutionTables;

    fn test_normalizer() -> Normalizer {
        Normalizer::new(
            SubstitutionTables::builtin(),
            BrandLexicon::from_entries(vec!["greenfield".to_string(), "heinz".to_string()]),
            Blacklist::from_words(vec!["акция".to_string(), "новинка".to_string()]),
        )
    }

    #[test]
    fn test_strip_digit_tokens() {
        assert_eq!(strip_digit_tokens("молоко 3.2% 930мл"), "молоко");
        assert_eq!(strip_digit_tokens("хлеб белый"), "хлеб белый");
        assert_eq!(strip_digit_tokens(""), "");
    }

    #[test]
    fn test_strip_service_chars() {
        assert_eq!(strip_service_chars("сыр, плавл. (порц.)"), "сыр плавл порц");
        assert_eq!(strip_service_chars("вода- газ"), "вода газ");
        // Infix hyphen inside a word survives until the de-hyphen retry.
        assert_eq!(strip_service_chars("дой-пак"), "дой-пак");
    }

    #[test]
    fn test_drop_short_tokens() {
        assert_eq!(drop_short_tokens("чай вс м уп"), "чай");
        // Cyrillic length counted in characters, not bytes.
        assert_eq!(drop_short_tokens("дом"), "дом");
    }

    #[test]
    fn test_slash_product_extraction() {
        let tables = SubstitutionTables::builtin();
        let (text, product) = extract_slash_product("бумага т/б мягкая", &tables.slash_products);
        assert_eq!(product.as_deref(), Some("туалетная бумага"));
        assert_eq!(text, "бумага мягкая");
    }

    #[test]
    fn test_latin_residue_becomes_brand() {
        let (text, brand) = extract_latin_residue("чай greenfield земляника", false);
        assert_eq!(text, "чай земляника");
        assert_eq!(brand.as_deref(), Some("greenfield"));

        // Already-known brand: tokens are still stripped, brand untouched.
        let (text, brand) = extract_latin_residue("чай lipton", true);
        assert_eq!(text, "чай");
        assert!(brand.is_none());
    }

    #[test]
    fn test_mr_ricco_brand_extraction() {
        let norm = test_normalizer();
        let record = norm.normalize("Майонез MR.RICCO Провансаль 67% д/п 400");

        assert_eq!(record.brand_norm.as_deref(), Some("mr.ricco"));
        // The brand token is gone from the working text; the rest remains
        // available for product resolution.
        assert!(!record.name_norm.contains("ricco"));
        assert!(record.name_norm.contains("майонез"));
        assert!(record.name_norm.contains("провансаль"));
        assert!(!record.name_norm.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_numeric_brand_survives_digit_stripping() {
        let norm = test_normalizer();
        let record = norm.normalize("Напиток 7UP лимон 1.5л");
        assert_eq!(record.brand_norm.as_deref(), Some("7up"));
        assert!(!record.name_norm.contains("7up"));
        assert!(record.name_norm.contains("напиток"));
    }

    #[test]
    fn test_blacklist_and_synonyms() {
        let norm = test_normalizer();
        let record = norm.normalize("АКЦИЯ майон прованс");
        assert!(!record.name_norm.contains("акция"));
        assert!(record.name_norm.contains("майонез"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let norm = test_normalizer();
        let inputs = [
            "Майонез MR.RICCO Провансаль 67% д/п 400",
            "Молоко Простоквашино 3.2% 930мл",
            "Чай GREENFIELD земляника 25пак",
            "вода",
            "",
        ];
        for input in inputs {
            let once = norm.normalize(input);
            let twice = norm.normalize(&once.name_norm);
            assert_eq!(
                twice.name_norm, once.name_norm,
                "normalization of {:?} is not idempotent",
                input
            );
        }
    }

    #[test]
    fn test_brand_priority_order() {
        // A numeric-brand hit wins over a later English-lexicon hit.
        let norm = test_normalizer();
        let record = norm.normalize("J7 сок heinz");
        assert_eq!(record.brand_norm.as_deref(), Some("j7"));
    }
}
