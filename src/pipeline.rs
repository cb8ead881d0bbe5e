// 🏭 Resolution engine - multi-pass orchestrator
// Sequences normalization and the resolvers over each record: brand, then
// three product attempts (as-is, de-hyphenated, stemmed), then category,
// then the brand-history fallback. Every field merge goes through the
// record's fill-only-if-empty setters, so monotonic refinement is enforced
// here and nowhere else.

use anyhow::Result;
use std::sync::Arc;

use crate::batch::BatchMapper;
use crate::catalog::CatalogSet;
use crate::classifier::CategoryModel;
use crate::normalizer::Normalizer;
use crate::record::ProductRecord;
use crate::resolve::{BrandHistoryResolver, BrandResolver, CategoryResolver, ProductResolver};
use crate::stem::RussianStemmer;
use crate::substitutions::SubstitutionTables;

/// Caller-facing knobs. `verbose` switches batch processing to
/// pass-at-a-time execution so per-pass resolution counts can be reported;
/// it never changes what gets resolved.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub verbose: bool,
    /// Batches below this size run sequentially.
    pub parallel_threshold: usize,
    /// Worker count; `None` sizes the pool to the machine.
    pub jobs: Option<usize>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            verbose: false,
            parallel_threshold: 64,
            jobs: None,
        }
    }
}

/// The assembled pipeline. Catalogs and the classifier are loaded once at
/// construction and shared read-only across worker threads; records flow
/// through independently of each other.
pub struct ResolutionEngine {
    normalizer: Normalizer,
    brands: BrandResolver,
    products: ProductResolver,
    categories: CategoryResolver,
    history: BrandHistoryResolver,
    stemmer: RussianStemmer,
    mapper: BatchMapper,
    verbose: bool,
}

impl ResolutionEngine {
    pub fn new(
        catalogs: CatalogSet,
        tables: SubstitutionTables,
        model: Arc<dyn CategoryModel>,
        options: EngineOptions,
    ) -> Result<Self> {
        let catalogs = Arc::new(catalogs);
        let normalizer = Normalizer::new(
            tables,
            catalogs.en_brands.clone(),
            catalogs.blacklist.clone(),
        );

        Ok(ResolutionEngine {
            normalizer,
            brands: BrandResolver::new(Arc::clone(&catalogs)),
            products: ProductResolver::new(Arc::clone(&catalogs), Arc::clone(&model)),
            categories: CategoryResolver::new(Arc::clone(&catalogs), model),
            history: BrandHistoryResolver::new(catalogs),
            stemmer: RussianStemmer::new(),
            mapper: BatchMapper::new(options.parallel_threshold, options.jobs)?,
            verbose: options.verbose,
        })
    }

    /// Resolve one raw description. Unresolvable fields stay empty; this
    /// never fails.
    pub fn resolve_one(&self, raw: &str) -> ProductRecord {
        let mut record = self.normalizer.normalize(raw);
        self.brand_pass(&mut record);
        self.product_pass(&mut record);
        self.dehyphen_pass(&mut record);
        self.stem_pass(&mut record);
        self.category_pass(&mut record);
        self.history_pass(&mut record);
        record
    }

    /// Resolve a batch, one output record per input, order preserved.
    pub fn resolve_batch(&self, raw_names: &[String]) -> Vec<ProductRecord> {
        if !self.verbose {
            return self.mapper.map(raw_names, |raw| self.resolve_one(raw));
        }

        // Verbose: run pass-at-a-time over the whole batch so the counts
        // after each pass can be reported.
        let mut records = self
            .mapper
            .map(raw_names, |raw| self.normalizer.normalize(raw));
        self.log_counts("normalize", &records);

        self.run_pass(&mut records, "brand", |rec| self.brand_pass(rec));
        self.run_pass(&mut records, "product", |rec| self.product_pass(rec));
        self.run_pass(&mut records, "product_dehyphen", |rec| self.dehyphen_pass(rec));
        self.run_pass(&mut records, "product_stemmed", |rec| self.stem_pass(rec));
        self.run_pass(&mut records, "category", |rec| self.category_pass(rec));
        self.run_pass(&mut records, "brand_history", |rec| self.history_pass(rec));

        records
    }

    // ========================================================================
    // PASSES
    // ========================================================================

    fn brand_pass(&self, rec: &mut ProductRecord) {
        if let Some(res) = self.brands.resolve(&rec.name_norm, rec.has_brand()) {
            rec.name_norm = res.name;
            rec.fill_brand(Some(res.brand));
        }
    }

    fn product_pass(&self, rec: &mut ProductRecord) {
        if let Some(res) = self.products.resolve(&rec.name_norm, rec.has_product()) {
            rec.fill_product(Some(res.product));
            rec.fill_category(Some(res.category));
        }
    }

    /// Second product attempt: catches catalog phrases that only surface
    /// once hyphenated spellings are split apart.
    fn dehyphen_pass(&self, rec: &mut ProductRecord) {
        if rec.name_norm.contains('-') {
            rec.name_norm = rec
                .name_norm
                .replace('-', " ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
        }
        self.product_pass(rec);
    }

    /// Third product attempt: reduce the working text to stem form first.
    fn stem_pass(&self, rec: &mut ProductRecord) {
        if !rec.has_product() && !rec.name_norm.is_empty() {
            rec.name_norm = self.stemmer.stem_text(&rec.name_norm);
        }
        self.product_pass(rec);
    }

    fn category_pass(&self, rec: &mut ProductRecord) {
        let category = self.categories.resolve(
            &rec.name_norm,
            rec.product_norm.as_deref(),
            rec.has_category(),
        );
        rec.fill_category(category);
    }

    fn history_pass(&self, rec: &mut ProductRecord) {
        if let Some(res) = self
            .history
            .resolve(rec.brand_norm.as_deref(), rec.has_product())
        {
            rec.fill_product(Some(res.product));
            rec.fill_category(Some(res.category));
        }
    }

    // ========================================================================
    // INSTRUMENTATION
    // ========================================================================

    fn run_pass<F>(&self, records: &mut Vec<ProductRecord>, pass: &str, f: F)
    where
        F: Fn(&mut ProductRecord) + Sync + Send,
    {
        self.mapper.for_each_mut(records, f);
        self.log_counts(pass, records);
    }

    /// Diagnostics only: how many records have each field resolved so far.
    fn log_counts(&self, pass: &str, records: &[ProductRecord]) {
        let brands = records.iter().filter(|r| r.has_brand()).count();
        let products = records.iter().filter(|r| r.has_product()).count();
        let categories = records.iter().filter(|r| r.has_category()).count();
        tracing::debug!(
            pass,
            total = records.len(),
            brands,
            products,
            categories,
            "pass complete"
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
