// 🧾 Core record types - ProductRecord and the closed category taxonomy
// One record per raw receipt line; resolvers only ever fill empty fields.

use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORY TAXONOMY
// ============================================================================

/// Closed set of 21 product categories.
///
/// The variant order is load-bearing: it is the output index order of the
/// pretrained category classifier, so `Category::ALL[argmax]` maps a logit
/// row back to a label. Catalog loading rejects any label outside this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Алкоголь")]
    Alcohol,
    #[serde(rename = "Бытовая техника")]
    Appliances,
    #[serde(rename = "Воды, соки, напитки")]
    Beverages,
    #[serde(rename = "Дача и гриль")]
    DachaAndGrill,
    /// Catch-all bucket.
    #[serde(rename = "Другое")]
    Other,
    #[serde(rename = "Замороженные продукты")]
    Frozen,
    #[serde(rename = "Зоотовары")]
    PetSupplies,
    #[serde(rename = "Красота, гигиена, бытовая химия")]
    BeautyAndHousehold,
    #[serde(rename = "Макароны, крупы, специи")]
    PastaGrainsSpices,
    #[serde(rename = "Молоко, сыр, яйца")]
    Dairy,
    #[serde(rename = "Овощи, фрукты, ягоды")]
    Produce,
    #[serde(rename = "Подборки и готовые блюда")]
    ReadyMeals,
    #[serde(rename = "Постные продукты")]
    LentenProducts,
    #[serde(rename = "Посуда")]
    Tableware,
    #[serde(rename = "Птица, мясо, деликатесы")]
    MeatAndPoultry,
    #[serde(rename = "Рыба, икра")]
    FishAndCaviar,
    #[serde(rename = "Соусы, орехи, консервы")]
    SaucesNutsCanned,
    #[serde(rename = "Товары для дома и дачи")]
    HomeAndGarden,
    #[serde(rename = "Товары для мам и детей")]
    MotherAndChild,
    #[serde(rename = "Хлеб, сладости, снеки")]
    BreadSweetsSnacks,
    #[serde(rename = "Чай, кофе, сахар")]
    TeaCoffeeSugar,
}

impl Category {
    /// All categories, in classifier output index order.
    pub const ALL: [Category; 21] = [
        Category::Alcohol,
        Category::Appliances,
        Category::Beverages,
        Category::DachaAndGrill,
        Category::Other,
        Category::Frozen,
        Category::PetSupplies,
        Category::BeautyAndHousehold,
        Category::PastaGrainsSpices,
        Category::Dairy,
        Category::Produce,
        Category::ReadyMeals,
        Category::LentenProducts,
        Category::Tableware,
        Category::MeatAndPoultry,
        Category::FishAndCaviar,
        Category::SaucesNutsCanned,
        Category::HomeAndGarden,
        Category::MotherAndChild,
        Category::BreadSweetsSnacks,
        Category::TeaCoffeeSugar,
    ];

    /// The label as it appears in catalogs and in final output.
    pub fn as_label(&self) -> &'static str {
        match self {
            Category::Alcohol => "Алкоголь",
            Category::Appliances => "Бытовая техника",
            Category::Beverages => "Воды, соки, напитки",
            Category::DachaAndGrill => "Дача и гриль",
            Category::Other => "Другое",
            Category::Frozen => "Замороженные продукты",
            Category::PetSupplies => "Зоотовары",
            Category::BeautyAndHousehold => "Красота, гигиена, бытовая химия",
            Category::PastaGrainsSpices => "Макароны, крупы, специи",
            Category::Dairy => "Молоко, сыр, яйца",
            Category::Produce => "Овощи, фрукты, ягоды",
            Category::ReadyMeals => "Подборки и готовые блюда",
            Category::LentenProducts => "Постные продукты",
            Category::Tableware => "Посуда",
            Category::MeatAndPoultry => "Птица, мясо, деликатесы",
            Category::FishAndCaviar => "Рыба, икра",
            Category::SaucesNutsCanned => "Соусы, орехи, консервы",
            Category::HomeAndGarden => "Товары для дома и дачи",
            Category::MotherAndChild => "Товары для мам и детей",
            Category::BreadSweetsSnacks => "Хлеб, сладости, снеки",
            Category::TeaCoffeeSugar => "Чай, кофе, сахар",
        }
    }

    /// Parse a catalog label back into a category.
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_label() == label)
    }
}

// ============================================================================
// PRODUCT RECORD
// ============================================================================

/// The unit of work: one raw receipt description and its resolved fields.
///
/// Invariant (monotonic refinement): once `product_norm`, `brand_norm` or
/// `cat_norm` is non-empty, no later pass may overwrite it. The orchestrator
/// merges stage outputs exclusively through the `fill_*` setters below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Raw description as printed on the receipt.
    pub raw_name: String,

    /// Normalized working text; shrinks as brands/products are cut out of it.
    pub name_norm: String,

    /// Recognized canonical product phrase(s), comma-joined when several.
    pub product_norm: Option<String>,

    /// Recognized brand.
    pub brand_norm: Option<String>,

    /// Category from the closed taxonomy.
    pub cat_norm: Option<Category>,
}

impl ProductRecord {
    /// Fresh record for one raw description; `name_norm` starts as a copy
    /// and is rewritten by the normalizer.
    pub fn new(raw_name: &str) -> Self {
        ProductRecord {
            raw_name: raw_name.to_string(),
            name_norm: raw_name.to_string(),
            product_norm: None,
            brand_norm: None,
            cat_norm: None,
        }
    }

    /// Set the product only if still empty.
    pub fn fill_product(&mut self, value: Option<String>) {
        if self.product_norm.is_none() {
            self.product_norm = value.filter(|v| !v.is_empty());
        }
    }

    /// Set the brand only if still empty.
    pub fn fill_brand(&mut self, value: Option<String>) {
        if self.brand_norm.is_none() {
            self.brand_norm = value.filter(|v| !v.is_empty());
        }
    }

    /// Set the category only if still empty.
    pub fn fill_category(&mut self, value: Option<Category>) {
        if self.cat_norm.is_none() {
            self.cat_norm = value;
        }
    }

    pub fn has_product(&self) -> bool {
        self.product_norm.is_some()
    }

    pub fn has_brand(&self) -> bool {
        self.brand_norm.is_some()
    }

    pub fn has_category(&self) -> bool {
        self.cat_norm.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_label(cat.as_label()), Some(cat));
        }
    }

    #[test]
    fn test_unknown_label_rejected() {
        assert_eq!(Category::from_label("Нет такой категории"), None);
        assert_eq!(Category::from_label(""), None);
    }

    #[test]
    fn test_classifier_index_order() {
        // Index 4 is the catch-all; the tail of the list is fixed too.
        assert_eq!(Category::ALL[4], Category::Other);
        assert_eq!(Category::ALL[20], Category::TeaCoffeeSugar);
        assert_eq!(Category::ALL.len(), 21);
    }

    #[test]
    fn test_fill_only_if_empty() {
        let mut record = ProductRecord::new("Молоко 3.2%");

        record.fill_brand(Some("простоквашино".to_string()));
        record.fill_brand(Some("другой бренд".to_string()));
        assert_eq!(record.brand_norm.as_deref(), Some("простоквашино"));

        record.fill_product(Some("молоко".to_string()));
        record.fill_product(Some("кефир".to_string()));
        assert_eq!(record.product_norm.as_deref(), Some("молоко"));

        record.fill_category(Some(Category::Dairy));
        record.fill_category(Some(Category::Other));
        assert_eq!(record.cat_norm, Some(Category::Dairy));
    }

    #[test]
    fn test_fill_ignores_empty_strings() {
        let mut record = ProductRecord::new("вода");
        record.fill_brand(Some(String::new()));
        assert!(record.brand_norm.is_none());

        // An empty fill must not block a later real fill.
        record.fill_brand(Some("аква".to_string()));
        assert_eq!(record.brand_norm.as_deref(), Some("аква"));
    }
}
