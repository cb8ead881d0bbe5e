// 📚 Reference catalogs - immutable lookup tables loaded once at startup
// Brand lexicons, the product→category catalog, brand history and the
// stop-word blacklist. All loading fails fast with the offending resource
// named; nothing here is ever mutated after construction.

use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::record::Category;

// ============================================================================
// BRAND LEXICON
// ============================================================================

/// Ordered list of known brand strings.
///
/// Order determines the match tie-break: the first lexicon entry found in a
/// candidate set wins. Russian and English brands are kept as two
/// independent instances.
#[derive(Debug, Clone)]
pub struct BrandLexicon {
    entries: Vec<String>,
}

impl BrandLexicon {
    /// Build from in-memory entries (tests, custom lexicons).
    pub fn from_entries(entries: Vec<String>) -> Self {
        BrandLexicon { entries }
    }

    /// Load from a single-column CSV (`brand`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let rdr = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open brand lexicon: {}", path.display()))?;
        Self::from_reader(rdr).with_context(|| format!("Malformed brand lexicon: {}", path.display()))
    }

    fn from_reader<R: Read>(mut rdr: csv::Reader<R>) -> Result<Self> {
        let idx = column_index(&mut rdr, "brand")?;
        let mut entries = Vec::new();
        for row in rdr.records() {
            let row = row.context("Failed to read brand lexicon row")?;
            let brand = row.get(idx).unwrap_or("").trim();
            if !brand.is_empty() {
                entries.push(brand.to_lowercase());
            }
        }
        Ok(BrandLexicon { entries })
    }

    /// Entries in lexicon order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// PRODUCT CATALOG
// ============================================================================

/// Mapping from a canonical product phrase to its category.
///
/// Row order is preserved: match enumeration and exact lookup both report
/// the first row in catalog order, which keeps multi-match reduction
/// deterministic.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    rows: Vec<(String, Category)>,
    phrases: HashSet<String>,
}

impl ProductCatalog {
    /// Build from in-memory rows (tests, custom catalogs).
    pub fn from_rows(rows: Vec<(String, Category)>) -> Self {
        let phrases = rows.iter().map(|(p, _)| p.clone()).collect();
        ProductCatalog { rows, phrases }
    }

    /// Load from a two-column CSV (`product`, `category`).
    ///
    /// A category label outside the closed taxonomy is a configuration
    /// error, not a row to skip.
    pub fn from_path(path: &Path) -> Result<Self> {
        let rdr = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open product catalog: {}", path.display()))?;
        Self::from_reader(rdr).with_context(|| format!("Malformed product catalog: {}", path.display()))
    }

    fn from_reader<R: Read>(mut rdr: csv::Reader<R>) -> Result<Self> {
        let product_idx = column_index(&mut rdr, "product")?;
        let category_idx = column_index(&mut rdr, "category")?;

        let mut rows = Vec::new();
        for row in rdr.records() {
            let row = row.context("Failed to read product catalog row")?;
            let product = row.get(product_idx).unwrap_or("").trim();
            if product.is_empty() {
                continue;
            }
            let label = row.get(category_idx).unwrap_or("").trim();
            let category = Category::from_label(label)
                .ok_or_else(|| anyhow!("Unknown category label `{}` for product `{}`", label, product))?;
            rows.push((product.to_lowercase(), category));
        }
        Ok(Self::from_rows(rows))
    }

    /// Membership test for one candidate phrase.
    pub fn contains(&self, phrase: &str) -> bool {
        self.phrases.contains(phrase)
    }

    /// Exact-value lookup; first row in catalog order wins.
    pub fn category_of(&self, product: &str) -> Option<Category> {
        self.rows.iter().find(|(p, _)| p == product).map(|(_, c)| *c)
    }

    /// All rows whose phrase appears in `candidates`, in catalog row order.
    pub fn matches<'a>(&'a self, candidates: &HashSet<String>) -> Vec<(&'a str, Category)> {
        self.rows
            .iter()
            .filter(|(p, _)| candidates.contains(p))
            .map(|(p, c)| (p.as_str(), *c))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// HISTORY TABLE
// ============================================================================

/// One historical observation of a fully resolved product.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub brand: String,
    pub product: String,
    pub category: Category,
}

/// Historical (brand, product, category) triples, used for the last-resort
/// brand fallback: the plurality product/category among a brand's rows.
#[derive(Debug, Clone)]
pub struct HistoryTable {
    rows: Vec<HistoryRow>,
}

impl HistoryTable {
    pub fn from_rows(rows: Vec<HistoryRow>) -> Self {
        HistoryTable { rows }
    }

    /// Load from CSV with columns `Бренд`, `Продукт`, `Категория`.
    /// Any additional metadata columns are ignored.
    pub fn from_path(path: &Path) -> Result<Self> {
        let rdr = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open history table: {}", path.display()))?;
        Self::from_reader(rdr).with_context(|| format!("Malformed history table: {}", path.display()))
    }

    fn from_reader<R: Read>(mut rdr: csv::Reader<R>) -> Result<Self> {
        let brand_idx = column_index(&mut rdr, "Бренд")?;
        let product_idx = column_index(&mut rdr, "Продукт")?;
        let category_idx = column_index(&mut rdr, "Категория")?;

        let mut rows = Vec::new();
        for row in rdr.records() {
            let row = row.context("Failed to read history table row")?;
            let brand = row.get(brand_idx).unwrap_or("").trim();
            let product = row.get(product_idx).unwrap_or("").trim();
            let label = row.get(category_idx).unwrap_or("").trim();
            if brand.is_empty() || product.is_empty() {
                continue;
            }
            let category = Category::from_label(label)
                .ok_or_else(|| anyhow!("Unknown category label `{}` for brand `{}`", label, brand))?;
            rows.push(HistoryRow {
                brand: brand.to_lowercase(),
                product: product.to_lowercase(),
                category,
            });
        }
        Ok(HistoryTable { rows })
    }

    /// All rows recorded for a brand, in table order.
    pub fn rows_for_brand<'a>(&'a self, brand: &str) -> Vec<&'a HistoryRow> {
        self.rows.iter().filter(|r| r.brand == brand).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// BLACKLIST
// ============================================================================

/// Stop words removed from the working text during normalization.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    words: HashSet<String>,
}

impl Blacklist {
    pub fn from_words<I: IntoIterator<Item = String>>(words: I) -> Self {
        Blacklist {
            words: words.into_iter().collect(),
        }
    }

    /// Load from a single-column CSV (`name`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let rdr = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open blacklist: {}", path.display()))?;
        Self::from_reader(rdr).with_context(|| format!("Malformed blacklist: {}", path.display()))
    }

    fn from_reader<R: Read>(mut rdr: csv::Reader<R>) -> Result<Self> {
        let idx = column_index(&mut rdr, "name")?;
        let mut words = HashSet::new();
        for row in rdr.records() {
            let row = row.context("Failed to read blacklist row")?;
            let word = row.get(idx).unwrap_or("").trim();
            if !word.is_empty() {
                words.insert(word.to_lowercase());
            }
        }
        Ok(Blacklist { words })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

// ============================================================================
// CATALOG SET
// ============================================================================

/// File locations of every reference catalog.
#[derive(Debug, Clone)]
pub struct CatalogPaths {
    pub brands_ru: PathBuf,
    pub brands_en: PathBuf,
    pub products: PathBuf,
    pub history: PathBuf,
    pub blacklist: PathBuf,
}

impl CatalogPaths {
    /// Conventional layout under a data directory, matching the collected
    /// dataset names (`brands_ru.csv`, `brands_en.csv`, `products.csv`,
    /// `all_clean.csv`, `blacklist.csv`).
    pub fn under_dir(dir: &Path) -> Self {
        CatalogPaths {
            brands_ru: dir.join("cleaned/brands_ru.csv"),
            brands_en: dir.join("cleaned/brands_en.csv"),
            products: dir.join("cleaned/products.csv"),
            history: dir.join("cleaned/all_clean.csv"),
            blacklist: dir.join("blacklist.csv"),
        }
    }
}

/// Every catalog the pipeline consumes, loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct CatalogSet {
    pub rus_brands: BrandLexicon,
    pub en_brands: BrandLexicon,
    pub products: ProductCatalog,
    pub history: HistoryTable,
    pub blacklist: Blacklist,
}

impl CatalogSet {
    /// Load all catalogs; any missing or malformed file aborts construction.
    pub fn load(paths: &CatalogPaths) -> Result<Self> {
        let rus_brands = BrandLexicon::from_path(&paths.brands_ru)?;
        let en_brands = BrandLexicon::from_path(&paths.brands_en)?;
        let products = ProductCatalog::from_path(&paths.products)?;
        let history = HistoryTable::from_path(&paths.history)?;
        let blacklist = Blacklist::from_path(&paths.blacklist)?;

        tracing::info!(
            rus_brands = rus_brands.len(),
            en_brands = en_brands.len(),
            products = products.len(),
            history = history.len(),
            blacklist = blacklist.len(),
            "catalogs loaded"
        );

        Ok(CatalogSet {
            rus_brands,
            en_brands,
            products,
            history,
            blacklist,
        })
    }
}

/// Position of a required column in the header row.
fn column_index<R: Read>(rdr: &mut csv::Reader<R>, name: &str) -> Result<usize> {
    let headers = rdr.headers().context("Failed to read CSV header")?;
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| anyhow!("Missing required column `{}`", name))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(data.as_bytes())
    }

    #[test]
    fn test_brand_lexicon_keeps_order() {
        let lexicon =
            BrandLexicon::from_reader(reader("brand\nПростоквашино\nдомик в деревне\n")).unwrap();
        let entries: Vec<&str> = lexicon.iter().collect();
        assert_eq!(entries, vec!["простоквашино", "домик в деревне"]);
    }

    #[test]
    fn test_brand_lexicon_missing_column() {
        let err = BrandLexicon::from_reader(reader("name\nx\n")).unwrap_err();
        assert!(err.to_string().contains("`brand`"));
    }

    #[test]
    fn test_product_catalog_lookup_and_matches() {
        let catalog = ProductCatalog::from_reader(reader(
            "product,category\nвода,\"Воды, соки, напитки\"\nвода питьевая,\"Воды, соки, напитки\"\nмолоко,\"Молоко, сыр, яйца\"\n",
        ))
        .unwrap();

        assert_eq!(catalog.category_of("молоко"), Some(Category::Dairy));
        assert_eq!(catalog.category_of("кефир"), None);

        let candidates: HashSet<String> =
            ["вода питьевая", "вода", "сок"].iter().map(|s| s.to_string()).collect();
        let matches = catalog.matches(&candidates);
        // Catalog row order, not candidate-set order.
        assert_eq!(matches[0].0, "вода");
        assert_eq!(matches[1].0, "вода питьевая");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_product_catalog_rejects_unknown_category() {
        let err =
            ProductCatalog::from_reader(reader("product,category\nвода,Напитки-такой-нет\n"))
                .unwrap_err();
        assert!(err.to_string().contains("Напитки-такой-нет"));
    }

    #[test]
    fn test_history_table_ignores_extra_columns() {
        let table = HistoryTable::from_reader(reader(
            "id,Бренд,Продукт,Категория,Магазин\n1,агуша,творог,\"Молоко, сыр, яйца\",магнит\n2,агуша,сок,\"Воды, соки, напитки\",лента\n",
        ))
        .unwrap();
        let rows = table.rows_for_brand("агуша");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product, "творог");
        assert!(table.rows_for_brand("nestle").is_empty());
    }

    #[test]
    fn test_blacklist_contains() {
        let blacklist = Blacklist::from_reader(reader("name\nакция\nцена\n")).unwrap();
        assert!(blacklist.contains("акция"));
        assert!(!blacklist.contains("молоко"));
    }
}
