// 🔎 Resolvers - catalog-backed entity resolution stages
// Each stage answers one question (brand? product? category?) from the
// read-only catalogs, and never touches a field another stage already
// settled. The orchestrator in `pipeline.rs` sequences them.

pub mod brand;
pub mod category;
pub mod history;
pub mod product;

pub use brand::{BrandResolution, BrandResolver};
pub use category::CategoryResolver;
pub use history::BrandHistoryResolver;
pub use product::{ProductResolution, ProductResolver};

use std::collections::HashSet;

/// Candidate phrases for catalog matching: every single token of `name`
/// plus every 2-token combination in order of appearance (earlier token
/// first). "молоко сгущ вареное" yields the singles plus "молоко сгущ",
/// "молоко вареное" and "сгущ вареное".
pub(crate) fn token_combinations(name: &str) -> HashSet<String> {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let mut set: HashSet<String> = tokens.iter().map(|t| t.to_string()).collect();
    for i in 0..tokens.len() {
        for j in (i + 1)..tokens.len() {
            set.insert(format!("{} {}", tokens[i], tokens[j]));
        }
    }
    set
}

/// Cut every occurrence of `phrase` out of `name`, collapsing the spaces
/// left behind. A phrase built from non-adjacent tokens simply never occurs
/// verbatim, leaving the name unchanged.
pub(crate) fn cut_phrase(name: &str, phrase: &str) -> String {
    name.replace(phrase, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
