use std::fmt;

use cartfill_schemas::{OrderLine, OrderLineError, Quantity};

/// A data row that could not become an order line.
///
/// `row` is the 1-based row number in the source range, header included, so
/// it matches what the operator sees in the sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderRowError {
    pub row: usize,
    pub error: OrderLineError,
}

impl fmt::Display for OrderRowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order row {}: {}", self.row, self.error)
    }
}

impl std::error::Error for OrderRowError {}

/// Quantity as the source delivered it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum QuantityCell {
    Text(String),
    Number(f64),
}

impl QuantityCell {
    fn is_blank(&self) -> bool {
        match self {
            QuantityCell::Text(t) => t.trim().is_empty(),
            QuantityCell::Number(_) => false,
        }
    }
}

/// Build the line for data row `row`. `Ok(None)` for a fully blank row.
pub(crate) fn build_line(
    row: usize,
    code: &str,
    quantity: QuantityCell,
    fallback: &str,
) -> Result<Option<OrderLine>, OrderRowError> {
    if code.trim().is_empty() && quantity.is_blank() && fallback.trim().is_empty() {
        return Ok(None);
    }

    let quantity = match quantity {
        QuantityCell::Text(t) => Quantity::parse(&t),
        QuantityCell::Number(n) => Quantity::from_number(n),
    }
    .map_err(|error| OrderRowError { row, error })?;

    OrderLine::new(code, quantity.as_str(), fallback)
        .map(Some)
        .map_err(|error| OrderRowError { row, error })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_row_is_skipped() {
        let got = build_line(4, " ", QuantityCell::Text(String::new()), "").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn numeric_quantity_is_rendered_without_fraction() {
        let line = build_line(2, "A100B", QuantityCell::Number(2.0), "HLP1")
            .unwrap()
            .unwrap();
        assert_eq!(line.quantity.as_str(), "2");
        assert_eq!(line.fallback_code, "HLP1");
    }

    #[test]
    fn blank_code_carries_row_number() {
        let err = build_line(7, "", QuantityCell::Text("3".into()), "HLP1").unwrap_err();
        assert_eq!(err.row, 7);
        assert_eq!(err.error, OrderLineError::EmptyCode);
        assert_eq!(err.to_string(), "order row 7: order line has an empty product code");
    }

    #[test]
    fn blank_quantity_is_an_error() {
        let err = build_line(3, "A1", QuantityCell::Text(" ".into()), "").unwrap_err();
        assert_eq!(err.error, OrderLineError::EmptyQuantity);
    }
}
