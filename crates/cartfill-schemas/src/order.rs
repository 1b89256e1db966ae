use std::fmt;

use serde::{Deserialize, Serialize};

/// Amount typed into the storefront's quantity field.
///
/// Kept as text: the cart field accepts whatever the operator wrote in the
/// sheet (`"2"`, `"10"`). If the text parses as a number it must be > 0.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(String);

impl Quantity {
    pub fn parse(raw: &str) -> Result<Self, OrderLineError> {
        let t = raw.trim();
        if t.is_empty() {
            return Err(OrderLineError::EmptyQuantity);
        }
        if let Ok(n) = t.parse::<f64>() {
            if !n.is_finite() || n <= 0.0 {
                return Err(OrderLineError::NonPositiveQuantity(t.to_string()));
            }
        }
        Ok(Self(t.to_string()))
    }

    /// Render a numeric spreadsheet cell. Integral values drop the fraction
    /// (`2.0` -> `"2"`).
    pub fn from_number(n: f64) -> Result<Self, OrderLineError> {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
            Self::parse(&format!("{}", n as i64))
        } else {
            Self::parse(&n.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the order sheet: primary code, quantity, fallback ("help") code.
///
/// Immutable once built. An empty `fallback_code` means there is nothing to
/// search on the fallback path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub primary_code: String,
    pub quantity: Quantity,
    pub fallback_code: String,
}

impl OrderLine {
    pub fn new(
        primary_code: impl Into<String>,
        quantity: &str,
        fallback_code: impl Into<String>,
    ) -> Result<Self, OrderLineError> {
        let primary_code = primary_code.into().trim().to_string();
        if primary_code.is_empty() {
            return Err(OrderLineError::EmptyCode);
        }
        Ok(Self {
            primary_code,
            quantity: Quantity::parse(quantity)?,
            fallback_code: fallback_code.into().trim().to_string(),
        })
    }

    pub fn has_fallback(&self) -> bool {
        !self.fallback_code.is_empty()
    }
}

/// Rejected order-line fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderLineError {
    EmptyCode,
    EmptyQuantity,
    NonPositiveQuantity(String),
}

impl fmt::Display for OrderLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderLineError::EmptyCode => write!(f, "order line has an empty product code"),
            OrderLineError::EmptyQuantity => write!(f, "order line has an empty quantity"),
            OrderLineError::NonPositiveQuantity(raw) => {
                write!(f, "order line quantity must be positive, got '{raw}'")
            }
        }
    }
}

impl std::error::Error for OrderLineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_keeps_trimmed_text() {
        assert_eq!(Quantity::parse(" 2 ").unwrap().as_str(), "2");
        assert_eq!(Quantity::parse("1 Stk").unwrap().as_str(), "1 Stk");
    }

    #[test]
    fn quantity_rejects_empty_and_non_positive() {
        assert_eq!(Quantity::parse("  "), Err(OrderLineError::EmptyQuantity));
        assert!(matches!(
            Quantity::parse("0"),
            Err(OrderLineError::NonPositiveQuantity(_))
        ));
        assert!(matches!(
            Quantity::parse("-3"),
            Err(OrderLineError::NonPositiveQuantity(_))
        ));
    }

    #[test]
    fn numeric_cells_render_without_fraction() {
        assert_eq!(Quantity::from_number(2.0).unwrap().as_str(), "2");
        assert_eq!(Quantity::from_number(1.5).unwrap().as_str(), "1.5");
        assert!(Quantity::from_number(0.0).is_err());
    }

    #[test]
    fn order_line_trims_codes() {
        let line = OrderLine::new(" A100B ", "2", " HLP1").unwrap();
        assert_eq!(line.primary_code, "A100B");
        assert_eq!(line.fallback_code, "HLP1");
        assert!(line.has_fallback());
    }

    #[test]
    fn order_line_requires_code() {
        assert_eq!(
            OrderLine::new("   ", "2", "HLP1"),
            Err(OrderLineError::EmptyCode)
        );
    }

    #[test]
    fn blank_fallback_is_allowed() {
        let line = OrderLine::new("A100B", "2", "").unwrap();
        assert!(!line.has_fallback());
    }
}
