// Receipt Product Resolution Engine - Core Library
// Turns raw receipt product descriptions into structured records (name,
// brand, product, category) through an ordered normalization chain,
// catalog-backed resolvers and a pretrained classifier fallback.

pub mod batch;
pub mod catalog;
pub mod classifier;
pub mod input;
pub mod normalizer;
pub mod pipeline;
pub mod record;
pub mod resolve;
pub mod stem;
pub mod substitutions;

// Re-export commonly used types
pub use batch::BatchMapper;
pub use catalog::{
    Blacklist, BrandLexicon, CatalogPaths, CatalogSet, HistoryRow, HistoryTable, ProductCatalog,
};
pub use classifier::{CategoryModel, FixedCategoryModel, LinearCategoryModel, ModelParams};
pub use input::read_name_column;
pub use normalizer::Normalizer;
pub use pipeline::{EngineOptions, ResolutionEngine};
pub use record::{Category, ProductRecord};
pub use resolve::{
    BrandHistoryResolver, BrandResolution, BrandResolver, CategoryResolver, ProductResolution,
    ProductResolver,
};
pub use stem::RussianStemmer;
pub use substitutions::SubstitutionTables;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
