//! Request/response bodies of the storefront API.

use cartfill_schemas::{CandidateProduct, Variant};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub products: Vec<ProductRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductRow {
    pub id: IdValue,
    pub code: String,
}

/// Product ids arrive as numbers or strings depending on the endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum IdValue {
    Text(String),
    Number(i64),
}

impl From<ProductRow> for CandidateProduct {
    fn from(row: ProductRow) -> Self {
        let id = match row.id {
            IdValue::Text(s) => s,
            IdValue::Number(n) => n.to_string(),
        };
        CandidateProduct::new(id, row.code)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariantsResponse {
    #[serde(default)]
    pub variants: Vec<VariantRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariantRow {
    pub code: String,
    /// Absent or null when the variant has no editable quantity control.
    #[serde(default)]
    pub quantity_field: Option<String>,
}

impl From<VariantRow> for Variant {
    fn from(row: VariantRow) -> Self {
        match row.quantity_field {
            Some(field) if !field.trim().is_empty() => Variant::available(row.code, field),
            _ => Variant::sold_out(row.code),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BasketRequest<'a> {
    pub quantity_field: &'a str,
    pub amount: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BasketResponse {
    #[serde(default)]
    pub message: Option<String>,
}
