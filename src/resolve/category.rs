// Category resolution: exact catalog lookup by resolved product, with the
// classifier as fallback for products the catalog cannot answer exactly
// (typically comma-joined multi-phrase products).

use std::sync::Arc;

use crate::catalog::CatalogSet;
use crate::classifier::CategoryModel;
use crate::record::Category;

pub struct CategoryResolver {
    catalogs: Arc<CatalogSet>,
    model: Arc<dyn CategoryModel>,
}

impl CategoryResolver {
    pub fn new(catalogs: Arc<CatalogSet>, model: Arc<dyn CategoryModel>) -> Self {
        CategoryResolver { catalogs, model }
    }

    /// No-op when the category is already known or no product was resolved.
    pub fn resolve(
        &self,
        name: &str,
        product: Option<&str>,
        category_known: bool,
    ) -> Option<Category> {
        if category_known {
            return None;
        }
        let product = product?;

        match self.catalogs.products.category_of(product) {
            Some(category) => Some(category),
            None => Some(self.model.predict(name)),
        }
    }
}
