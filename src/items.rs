//! Items
//!
//! Cart entries fed into the pricing engine: one catalog option with a resolved quantity,
//! unit price and tags.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tags::{collection::TagCollection, string::StringTagCollection};

/// One selectable catalog option with a resolved quantity.
///
/// Negative quantities and prices are accepted on construction and floored to zero
/// by the accessors, so the engine never sees them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    option_id: String,
    #[serde(default)]
    qty: i64,
    #[serde(default)]
    unit_price: Decimal,
    #[serde(default)]
    tags: StringTagCollection,
}

impl LineItem {
    /// Creates a new line item with no tags.
    pub fn new(option_id: impl Into<String>, qty: i64, unit_price: Decimal) -> Self {
        Self::with_tags(option_id, qty, unit_price, StringTagCollection::empty())
    }

    /// Creates a new line item with the given tags.
    pub fn with_tags(
        option_id: impl Into<String>,
        qty: i64,
        unit_price: Decimal,
        tags: StringTagCollection,
    ) -> Self {
        Self {
            option_id: option_id.into(),
            qty,
            unit_price,
            tags,
        }
    }

    /// Returns the option identifier.
    pub fn option_id(&self) -> &str {
        &self.option_id
    }

    /// Returns the quantity, floored at zero.
    pub fn qty(&self) -> i64 {
        self.qty.max(0)
    }

    /// Returns the unit price, floored at zero.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price.max(Decimal::ZERO)
    }

    /// Returns the tags for the item.
    pub fn tags(&self) -> &StringTagCollection {
        &self.tags
    }

    /// Whether the option counts as selected (quantity above zero).
    pub fn is_selected(&self) -> bool {
        self.qty > 0
    }

    /// `unit_price * qty` after clamping, saturating instead of overflowing.
    pub fn line_total(&self) -> Decimal {
        self.unit_price()
            .checked_mul(Decimal::from(self.qty()))
            .unwrap_or(Decimal::MAX)
    }
}

/// Sum of line totals over the given items, saturating at [`Decimal::MAX`].
pub fn sum_line_totals<'a>(items: impl IntoIterator<Item = &'a LineItem>) -> Decimal {
    items.into_iter().fold(Decimal::ZERO, |acc, item| {
        acc.checked_add(item.line_total()).unwrap_or(Decimal::MAX)
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn negative_values_are_floored() {
        let item = LineItem::new("core-a", -3, dec!(-10));

        assert_eq!(item.qty(), 0);
        assert_eq!(item.unit_price(), Decimal::ZERO);
        assert_eq!(item.line_total(), Decimal::ZERO);
        assert!(!item.is_selected());
    }

    #[test]
    fn line_total_multiplies_price_by_qty() {
        let item = LineItem::new("core-a", 3, dec!(12.50));

        assert_eq!(item.line_total(), dec!(37.50));
    }

    #[test]
    fn line_total_saturates() {
        let item = LineItem::new("huge", i64::MAX, Decimal::MAX);

        assert_eq!(item.line_total(), Decimal::MAX);
        assert_eq!(sum_line_totals([&item, &item]), Decimal::MAX);
    }

    #[test]
    fn deserializes_storage_shape() -> TestResult {
        let item: LineItem = serde_json::from_str(
            r#"{"optionId":"lighting-pro","qty":1,"unitPrice":980,"tags":["premium","lighting"]}"#,
        )?;

        assert_eq!(item.option_id(), "lighting-pro");
        assert_eq!(item.unit_price(), dec!(980));
        assert!(item.tags().contains("premium"));

        Ok(())
    }
}
