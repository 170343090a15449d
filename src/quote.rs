//! Quotes
//!
//! The caller side of the engine: validating what a client selected, resolving selections
//! against the option catalog into [`LineItem`]s, blocking quotes that violate a rule and
//! snapshotting rounded totals.

use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    items::LineItem,
    pricing::{Evaluation, Violation, evaluate_pricing},
    rules::{RawRule, discounts::percent_of},
    tags::string::StringTagCollection,
};

/// Largest quantity a client may request for one option.
pub const MAX_OPTION_QUANTITY: i64 = 9_999;

/// A client's request for an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Selected option.
    pub option_id: String,

    /// Requested quantity. Zero keeps the option in the quote without selecting it.
    #[serde(default)]
    pub qty: i64,
}

impl Selection {
    /// Create a selection.
    pub fn new(option_id: impl Into<String>, qty: i64) -> Self {
        Self {
            option_id: option_id.into(),
            qty,
        }
    }
}

/// Errors related to client selections.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// A selection has a blank option id.
    #[error("selection {0} has no option id")]
    BlankOptionId(usize),

    /// A quantity is below zero.
    #[error("quantity {qty} for {option_id} is negative")]
    NegativeQuantity {
        /// Offending option.
        option_id: String,
        /// Requested quantity.
        qty: i64,
    },

    /// A quantity is above [`MAX_OPTION_QUANTITY`].
    #[error("quantity {qty} for {option_id} exceeds the maximum of {max}", max = MAX_OPTION_QUANTITY)]
    QuantityTooLarge {
        /// Offending option.
        option_id: String,
        /// Requested quantity.
        qty: i64,
    },

    /// The same option is selected twice.
    #[error("option {0} is selected more than once")]
    DuplicateOption(String),
}

/// Check client selections before they are priced.
///
/// # Errors
///
/// Returns the first [`SelectionError`] found, in selection order.
pub fn validate_selections(selections: &[Selection]) -> Result<(), SelectionError> {
    let mut seen = FxHashSet::default();

    for (index, selection) in selections.iter().enumerate() {
        let option_id = selection.option_id.trim();

        if option_id.is_empty() {
            return Err(SelectionError::BlankOptionId(index));
        }

        if selection.qty < 0 {
            return Err(SelectionError::NegativeQuantity {
                option_id: option_id.to_string(),
                qty: selection.qty,
            });
        }

        if selection.qty > MAX_OPTION_QUANTITY {
            return Err(SelectionError::QuantityTooLarge {
                option_id: option_id.to_string(),
                qty: selection.qty,
            });
        }

        if !seen.insert(option_id) {
            return Err(SelectionError::DuplicateOption(option_id.to_string()));
        }
    }

    Ok(())
}

/// A proposal option as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOption {
    /// Option identifier.
    pub option_id: String,

    /// Proposal-specific price, preferred over the catalog price.
    #[serde(default)]
    pub override_price: Option<Decimal>,

    /// List price of the underlying catalog item.
    #[serde(default)]
    pub catalog_price: Option<Decimal>,

    /// Tags of the option.
    #[serde(default)]
    pub tags: StringTagCollection,
}

impl CatalogOption {
    /// Create an option priced from the catalog.
    pub fn new(option_id: impl Into<String>, catalog_price: Decimal, tags: &[&str]) -> Self {
        Self {
            option_id: option_id.into(),
            override_price: None,
            catalog_price: Some(catalog_price),
            tags: StringTagCollection::from_strs(tags),
        }
    }

    /// Set a proposal-specific price.
    #[must_use]
    pub fn with_override_price(mut self, price: Decimal) -> Self {
        self.override_price = Some(price);
        self
    }

    /// The override price, else the catalog price, else zero.
    pub fn unit_price(&self) -> Decimal {
        self.override_price
            .or(self.catalog_price)
            .unwrap_or(Decimal::ZERO)
    }

    /// A line item for this option at the given quantity.
    pub fn line_item(&self, qty: i64) -> LineItem {
        LineItem::with_tags(self.option_id.clone(), qty, self.unit_price(), self.tags.clone())
    }
}

/// Lookup of selectable options by id.
pub trait OptionCatalog {
    /// The option with the given id, if the catalog has one.
    fn option(&self, option_id: &str) -> Option<&CatalogOption>;
}

/// In-memory [`OptionCatalog`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    options: FxHashMap<String, CatalogOption>,
}

impl Catalog {
    /// Number of options in the catalog.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Add an option, replacing any option with the same id.
    pub fn insert(&mut self, option: CatalogOption) {
        self.options.insert(option.option_id.clone(), option);
    }
}

impl FromIterator<CatalogOption> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogOption>>(iter: I) -> Self {
        let mut catalog = Self::default();

        for option in iter {
            catalog.insert(option);
        }

        catalog
    }
}

impl OptionCatalog for Catalog {
    fn option(&self, option_id: &str) -> Option<&CatalogOption> {
        self.options.get(option_id)
    }
}

/// Errors raised while pricing a client's selections.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuoteError {
    /// The selections are malformed.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// A selection names an option the catalog does not have.
    #[error("unknown option {0}")]
    UnknownOption(String),

    /// A `require` or `mutex` rule is violated; the message is the first violation's.
    #[error("{message}")]
    Blocked {
        /// Message of the first violation.
        message: String,
        /// Every violation, in rule order.
        violations: Vec<Violation>,
    },
}

/// Turn validated selections into line items, in selection order.
///
/// # Errors
///
/// Returns a [`QuoteError`] if the selections are malformed or name an unknown option.
pub fn resolve_line_items<C: OptionCatalog + ?Sized>(
    catalog: &C,
    selections: &[Selection],
) -> Result<Vec<LineItem>, QuoteError> {
    validate_selections(selections)?;

    selections
        .iter()
        .map(|selection| {
            let option_id = selection.option_id.trim();

            catalog
                .option(option_id)
                .map(|option| option.line_item(selection.qty))
                .ok_or_else(|| QuoteError::UnknownOption(option_id.to_string()))
        })
        .collect()
}

/// Price a client's selections, refusing quotes that break a rule.
///
/// # Errors
///
/// Returns [`QuoteError::Blocked`] when any rule is violated, or another [`QuoteError`]
/// when the selections cannot be resolved.
#[tracing::instrument(
    name = "quote.price_selections",
    level = "debug",
    skip_all,
    fields(selections = selections.len(), rules = rules.len())
)]
pub fn price_selections<C: OptionCatalog + ?Sized>(
    catalog: &C,
    selections: &[Selection],
    rules: &[RawRule],
    fallback_tax_rate: Option<Decimal>,
) -> Result<Evaluation, QuoteError> {
    let items = resolve_line_items(catalog, selections)?;
    let evaluation = evaluate_pricing(&items, rules, fallback_tax_rate);

    match evaluation.first_violation() {
        Some(first) => {
            debug!(rule_id = %first.rule_id, "quote blocked by rule");

            Err(QuoteError::Blocked {
                message: first.message.clone(),
                violations: evaluation.violations().to_vec(),
            })
        }
        None => Ok(evaluation),
    }
}

/// How much of the total is due up front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DepositPolicy {
    /// Nothing up front.
    #[default]
    None,

    /// A percentage of the total (`30` means 30%).
    Percentage(Decimal),

    /// A fixed amount.
    Fixed(Decimal),
}

impl DepositPolicy {
    /// Deposit due on `total`, never negative and never above the total.
    pub fn deposit(self, total: Decimal) -> Decimal {
        let total = total.max(Decimal::ZERO);
        let deposit = match self {
            Self::None => Decimal::ZERO,
            Self::Percentage(percentage) => percent_of(total, percentage),
            Self::Fixed(amount) => amount,
        };

        round_money(deposit.clamp(Decimal::ZERO, total))
    }
}

/// Rounded totals persisted with an accepted quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTotals {
    /// Rounded subtotal.
    pub subtotal: Decimal,

    /// Rounded discount.
    pub discount: Decimal,

    /// Rounded tax.
    pub tax: Decimal,

    /// Rounded total.
    pub total: Decimal,

    /// Deposit due, at most the rounded total.
    pub deposit: Decimal,

    /// Currency label, carried through unchanged.
    pub currency: String,
}

impl QuoteTotals {
    /// Snapshot an evaluation, rounding every amount to two decimal places.
    pub fn from_evaluation(
        evaluation: &Evaluation,
        deposit: DepositPolicy,
        currency: impl Into<String>,
    ) -> Self {
        let total = round_money(evaluation.total());

        Self {
            subtotal: round_money(evaluation.subtotal()),
            discount: round_money(evaluation.discount()),
            tax: round_money(evaluation.tax()),
            total,
            deposit: deposit.deposit(total),
            currency: currency.into(),
        }
    }
}

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;
    use testresult::TestResult;

    use crate::tags::collection::TagCollection;

    use super::*;

    fn catalog() -> Catalog {
        [
            CatalogOption::new("core-a", dec!(1200), &["core", "dj"]),
            CatalogOption::new("lighting-pro", dec!(980), &["lighting", "premium"])
                .with_override_price(dec!(900)),
            CatalogOption {
                option_id: "travel".to_string(),
                override_price: None,
                catalog_price: None,
                tags: StringTagCollection::empty(),
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn selections_are_checked_in_order() {
        assert_eq!(
            validate_selections(&[Selection::new(" ", 1)]),
            Err(SelectionError::BlankOptionId(0))
        );
        assert_eq!(
            validate_selections(&[Selection::new("core-a", -1)]),
            Err(SelectionError::NegativeQuantity {
                option_id: "core-a".to_string(),
                qty: -1
            })
        );
        assert_eq!(
            validate_selections(&[Selection::new("core-a", MAX_OPTION_QUANTITY + 1)]),
            Err(SelectionError::QuantityTooLarge {
                option_id: "core-a".to_string(),
                qty: MAX_OPTION_QUANTITY + 1
            })
        );
        assert_eq!(
            validate_selections(&[Selection::new("core-a", 1), Selection::new("core-a ", 0)]),
            Err(SelectionError::DuplicateOption("core-a".to_string()))
        );
        assert_eq!(
            validate_selections(&[Selection::new("core-a", 0), Selection::new("travel", 3)]),
            Ok(())
        );
    }

    #[test]
    fn unit_price_prefers_override() -> TestResult {
        let catalog = catalog();
        let items = resolve_line_items(
            &catalog,
            &[
                Selection::new("lighting-pro", 2),
                Selection::new("travel", 1),
                Selection::new("core-a", 1),
            ],
        )?;

        let prices: Vec<Decimal> = items.iter().map(LineItem::unit_price).collect();

        assert_eq!(prices, vec![dec!(900), Decimal::ZERO, dec!(1200)]);

        Ok(())
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert_eq!(
            resolve_line_items(&catalog(), &[Selection::new("smoke-machine", 1)]),
            Err(QuoteError::UnknownOption("smoke-machine".to_string()))
        );
    }

    #[test]
    fn violations_block_the_quote() {
        let rules = [RawRule::new(
            "mx",
            "mutex",
            json!({ "optionIds": ["core-a", "lighting-pro"] }),
        )];

        let result = price_selections(
            &catalog(),
            &[Selection::new("core-a", 1), Selection::new("lighting-pro", 1)],
            &rules,
            None,
        );

        assert!(matches!(
            result,
            Err(QuoteError::Blocked { ref message, ref violations })
                if message == "Only one of the conflicting options may be selected"
                    && violations.len() == 1
        ));
    }

    #[test]
    fn totals_round_half_away_from_zero() -> TestResult {
        let catalog: Catalog = [CatalogOption::new("hour", dec!(33.335), &[])]
            .into_iter()
            .collect();
        let rules = [RawRule::new("vat", "tax_pct", json!({ "percentage": 10 }))];

        let evaluation = price_selections(&catalog, &[Selection::new("hour", 1)], &rules, None)?;
        let totals = QuoteTotals::from_evaluation(
            &evaluation,
            DepositPolicy::Percentage(dec!(50)),
            "EUR",
        );

        assert_eq!(totals.subtotal, dec!(33.34));
        assert_eq!(totals.tax, dec!(3.33));
        assert_eq!(totals.total, dec!(36.67));
        assert_eq!(totals.deposit, dec!(18.34));
        assert_eq!(totals.currency, "EUR");

        Ok(())
    }

    #[test]
    fn deposit_is_bounded_by_total() {
        assert_eq!(DepositPolicy::Fixed(dec!(500)).deposit(dec!(120)), dec!(120));
        assert_eq!(DepositPolicy::Fixed(dec!(-5)).deposit(dec!(120)), Decimal::ZERO);
        assert_eq!(DepositPolicy::Percentage(dec!(150)).deposit(dec!(80)), dec!(80));
        assert_eq!(DepositPolicy::None.deposit(dec!(80)), Decimal::ZERO);
    }
}
