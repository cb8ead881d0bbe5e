// Russian stemming for the lemmatization retry.
// The morphological reduction itself is delegated to the Snowball stemmer;
// this wrapper only applies it token by token so a whole working string can
// be retried against the product catalog in stem form.

use rust_stemmers::{Algorithm, Stemmer};

pub struct RussianStemmer {
    stemmer: Stemmer,
}

impl RussianStemmer {
    pub fn new() -> Self {
        RussianStemmer {
            stemmer: Stemmer::create(Algorithm::Russian),
        }
    }

    /// Stem every whitespace-delimited token and rejoin with single spaces.
    /// Input is expected lowercase (the normalizer guarantees it).
    pub fn stem_text(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| self.stemmer.stem(token).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for RussianStemmer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stems_inflected_forms_together() {
        let stemmer = RussianStemmer::new();
        // Both inflections collapse to one stem.
        assert_eq!(
            stemmer.stem_text("сгущенное"),
            stemmer.stem_text("сгущенного")
        );
    }

    #[test]
    fn test_stem_text_preserves_token_count() {
        let stemmer = RussianStemmer::new();
        let stemmed = stemmer.stem_text("молоко сгущенное вареное");
        assert_eq!(stemmed.split_whitespace().count(), 3);
    }

    #[test]
    fn test_stem_empty() {
        let stemmer = RussianStemmer::new();
        assert_eq!(stemmer.stem_text(""), "");
    }
}
