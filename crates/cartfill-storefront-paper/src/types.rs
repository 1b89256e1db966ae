use serde::{Deserialize, Serialize};

/// Fixture catalog loaded from JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperCatalog {
    pub products: Vec<PaperProduct>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperProduct {
    pub id: String,
    pub code: String,
    /// Extra terms this product is found under (e.g. a help code).
    #[serde(default)]
    pub search_terms: Vec<String>,
    #[serde(default)]
    pub variants: Vec<PaperVariant>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperVariant {
    pub code: String,
    /// 0 = sold out.
    pub stock: u32,
}

/// One accepted commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketLine {
    pub field: String,
    pub product_id: String,
    pub variant_code: String,
    pub quantity: String,
}
