//! Discount Rules
//!
//! Fixed, percentage and tiered-threshold percentage discounts. Each one is gated by a
//! [`Trigger`] and calculated against the eligible subtotal selected by its [`AppliesTo`]
//! filter.

use rust_decimal::Decimal;
use serde_json::Value;
use smallvec::SmallVec;

use crate::{
    rules::{
        config::{ConfigReader, ParseMode, parse_number},
        errors::RuleConfigError,
    },
    selection::{AppliesTo, SelectionState, Trigger},
};

/// Typed config for a `discount_fixed` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDiscountConfig {
    /// Amount off, capped at the eligible subtotal.
    pub amount: Decimal,

    /// What activates the discount.
    pub trigger: Trigger,

    /// Which items the discount is calculated against.
    pub applies_to: AppliesTo,
}

impl FixedDiscountConfig {
    pub(crate) fn parse(reader: &ConfigReader<'_>) -> Result<Self, RuleConfigError> {
        Ok(Self {
            amount: reader.positive("amount")?,
            trigger: reader.trigger()?,
            applies_to: reader.applies_to()?,
        })
    }

    /// Discount contributed by this rule for the selection.
    pub fn discount(&self, state: &SelectionState<'_>) -> Decimal {
        if !state.is_triggered(&self.trigger) {
            return Decimal::ZERO;
        }

        self.amount.min(state.eligible_subtotal(&self.applies_to))
    }
}

/// Typed config for a `discount_pct` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentDiscountConfig {
    /// Percentage off (`10` means 10%).
    pub percentage: Decimal,

    /// What activates the discount.
    pub trigger: Trigger,

    /// Which items the discount is calculated against.
    pub applies_to: AppliesTo,
}

impl PercentDiscountConfig {
    pub(crate) fn parse(reader: &ConfigReader<'_>) -> Result<Self, RuleConfigError> {
        Ok(Self {
            percentage: reader.positive("percentage")?,
            trigger: reader.trigger()?,
            applies_to: reader.applies_to()?,
        })
    }

    /// Discount contributed by this rule for the selection.
    pub fn discount(&self, state: &SelectionState<'_>) -> Decimal {
        if !state.is_triggered(&self.trigger) {
            return Decimal::ZERO;
        }

        percent_of(state.eligible_subtotal(&self.applies_to), self.percentage)
    }
}

/// One `{minimum, percentage}` pair of a threshold discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountTier {
    /// Eligible subtotal needed for the tier.
    pub minimum: Decimal,

    /// Percentage off once the tier applies.
    pub percentage: Decimal,
}

/// Typed config for a `discount_threshold_pct` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdDiscountConfig {
    /// Valid tiers in config order. Never empty.
    pub tiers: SmallVec<[DiscountTier; 4]>,

    /// What activates the discount.
    pub trigger: Trigger,

    /// Which items the discount is calculated against.
    pub applies_to: AppliesTo,
}

impl ThresholdDiscountConfig {
    pub(crate) fn parse(reader: &ConfigReader<'_>) -> Result<Self, RuleConfigError> {
        let entries = match reader.get("thresholds") {
            None | Some(Value::Null) => {
                return Err(RuleConfigError::MissingField {
                    rule_id: reader.rule_id(),
                    field: "thresholds",
                });
            }
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(RuleConfigError::InvalidList {
                    rule_id: reader.rule_id(),
                    field: "thresholds",
                });
            }
        };

        let mut tiers = SmallVec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            match parse_tier(entry) {
                Ok(tier) => tiers.push(tier),
                Err(reason) if reader.mode() == ParseMode::Strict => {
                    return Err(RuleConfigError::InvalidTier {
                        rule_id: reader.rule_id(),
                        index,
                        reason,
                    });
                }
                Err(_) => {}
            }
        }

        if tiers.is_empty() {
            return Err(RuleConfigError::EmptyRule {
                rule_id: reader.rule_id(),
                what: "valid thresholds",
            });
        }

        Ok(Self {
            tiers,
            trigger: reader.trigger()?,
            applies_to: reader.applies_to()?,
        })
    }

    /// The tier with the highest minimum the eligible subtotal reaches.
    ///
    /// Tiers sharing a minimum resolve to the one listed first.
    pub fn best_tier(&self, eligible_subtotal: Decimal) -> Option<&DiscountTier> {
        self.tiers
            .iter()
            .filter(|tier| eligible_subtotal >= tier.minimum)
            .fold(None, |best: Option<&DiscountTier>, tier| match best {
                Some(current) if current.minimum >= tier.minimum => Some(current),
                _ => Some(tier),
            })
    }

    /// Discount contributed by this rule for the selection.
    pub fn discount(&self, state: &SelectionState<'_>) -> Decimal {
        if !state.is_triggered(&self.trigger) {
            return Decimal::ZERO;
        }

        let eligible = state.eligible_subtotal(&self.applies_to);

        self.best_tier(eligible)
            .map_or(Decimal::ZERO, |tier| percent_of(eligible, tier.percentage))
    }
}

fn parse_tier(entry: &Value) -> Result<DiscountTier, &'static str> {
    let fields = entry.as_object().ok_or("tier must be an object")?;

    let minimum = fields
        .get("minimum")
        .and_then(parse_number)
        .ok_or("minimum must be a number")?;
    let percentage = fields
        .get("percentage")
        .and_then(parse_number)
        .ok_or("percentage must be a number")?;

    if minimum < Decimal::ZERO {
        return Err("minimum must be zero or more");
    }

    if percentage <= Decimal::ZERO {
        return Err("percentage must be greater than zero");
    }

    Ok(DiscountTier {
        minimum,
        percentage,
    })
}

/// `amount * percentage / 100`, saturating instead of overflowing.
///
/// `percentage` is in points (`10` means 10%), the unit rule configs are authored in. If the
/// full product overflows, the amount is scaled down first; if that still overflows the
/// result is `Decimal::MAX`.
pub(crate) fn percent_of(amount: Decimal, percentage: Decimal) -> Decimal {
    amount
        .checked_mul(percentage)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .or_else(|| {
            amount
                .checked_div(Decimal::ONE_HUNDRED)?
                .checked_mul(percentage)
        })
        .unwrap_or(Decimal::MAX)
}
