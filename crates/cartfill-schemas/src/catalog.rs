use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque storefront handle for a search-result row.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog search-result row, before variant expansion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProduct {
    pub id: CandidateId,
    pub code: String,
}

impl CandidateProduct {
    pub fn new(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: CandidateId::new(id),
            code: code.into(),
        }
    }
}

/// Opaque handle for a variant's editable quantity control.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuantityField(pub String);

impl QuantityField {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether a variant can take a quantity.
///
/// Sold-out is inferred from the absence of an editable quantity control, so
/// a sold-out variant has no field to carry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "field", rename_all = "snake_case")]
pub enum VariantSlot {
    Available(QuantityField),
    SoldOut,
}

/// One purchasable unit under an expanded candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub displayed_code: String,
    pub slot: VariantSlot,
}

impl Variant {
    pub fn available(displayed_code: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            displayed_code: displayed_code.into(),
            slot: VariantSlot::Available(QuantityField::new(field)),
        }
    }

    pub fn sold_out(displayed_code: impl Into<String>) -> Self {
        Self {
            displayed_code: displayed_code.into(),
            slot: VariantSlot::SoldOut,
        }
    }

    pub fn is_sold_out(&self) -> bool {
        matches!(self.slot, VariantSlot::SoldOut)
    }

    pub fn quantity_field(&self) -> Option<&QuantityField> {
        match &self.slot {
            VariantSlot::Available(f) => Some(f),
            VariantSlot::SoldOut => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sold_out_variant_has_no_field() {
        let v = Variant::sold_out("A100B");
        assert!(v.is_sold_out());
        assert!(v.quantity_field().is_none());

        let v = Variant::available("A100B", "qty-7");
        assert!(!v.is_sold_out());
        assert_eq!(v.quantity_field().map(|f| f.as_str()), Some("qty-7"));
    }

    #[test]
    fn slot_serializes_with_state_tag() {
        let json = serde_json::to_value(Variant::available("A1", "f1")).unwrap();
        assert_eq!(json["slot"]["state"], "available");
        assert_eq!(json["slot"]["field"], "f1");

        let json = serde_json::to_value(Variant::sold_out("A1")).unwrap();
        assert_eq!(json["slot"]["state"], "sold_out");
    }
}
