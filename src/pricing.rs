//! Pricing
//!
//! Evaluates an ordered rule list against a cart in a single left-to-right pass:
//!
//! 1. `subtotal` sums `unit_price * qty` over all items (both floored at zero).
//! 2. Each rule in order adds to the running discount, replaces the working tax rate,
//!    or appends a violation.
//! 3. The accumulated discount is clamped to the subtotal once, after the pass.
//! 4. Tax is charged on the discounted subtotal at the last rate seen.
//!
//! Evaluation never fails. A rule whose config cannot be parsed is skipped and logged at
//! `debug` level; the remaining rules still apply.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    items::{LineItem, sum_line_totals},
    rules::{
        PricingRule, RawRule, RuleConfig, RuleMeta, config::ParseMode, mutex::MutexConfig,
        require::RequireConfig,
    },
    selection::SelectionState,
};

/// An unsatisfied `require` or `mutex` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Rule that produced the violation.
    pub rule_id: String,

    /// Name of that rule, if it has one.
    pub rule_name: Option<String>,

    /// Human-readable description.
    pub message: String,
}

impl Violation {
    fn new(meta: &RuleMeta, message: String) -> Self {
        Self {
            rule_id: meta.id().to_string(),
            rule_name: meta.name().map(str::to_string),
            message,
        }
    }
}

/// Priced result of one evaluation. Amounts are unrounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    subtotal: Decimal,
    discount: Decimal,
    tax: Decimal,
    total: Decimal,
    violations: Vec<Violation>,
}

impl Evaluation {
    /// Sum of line totals over selected items.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Discount actually applied; never more than the subtotal.
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// Tax on the discounted subtotal.
    pub fn tax(&self) -> Decimal {
        self.tax
    }

    /// Discounted subtotal plus tax.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Unsatisfied rules, in rule order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// The first violation, which callers show when blocking a transaction.
    pub fn first_violation(&self) -> Option<&Violation> {
        self.violations.first()
    }

    /// Whether any rule was violated.
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}

/// Running state of the rule pass.
#[derive(Debug)]
struct Accumulator {
    discount_total: Decimal,
    tax_rate: Decimal,
    violations: Vec<Violation>,
}

impl Accumulator {
    fn new(fallback_tax_rate: Option<Decimal>) -> Self {
        Self {
            discount_total: Decimal::ZERO,
            tax_rate: fallback_tax_rate.unwrap_or(Decimal::ZERO),
            violations: Vec::new(),
        }
    }

    fn apply(&mut self, rule: &PricingRule, state: &SelectionState<'_>) {
        match rule.config() {
            RuleConfig::Require(config) => {
                if config.is_violated(state) {
                    self.violations
                        .push(Violation::new(rule.meta(), RequireConfig::message(rule.meta())));
                }
            }
            RuleConfig::Mutex(config) => {
                if config.is_violated(state) {
                    self.violations
                        .push(Violation::new(rule.meta(), MutexConfig::message(rule.meta())));
                }
            }
            RuleConfig::DiscountFixed(config) => self.add_discount(config.discount(state)),
            RuleConfig::DiscountPct(config) => self.add_discount(config.discount(state)),
            RuleConfig::DiscountThresholdPct(config) => self.add_discount(config.discount(state)),
            RuleConfig::TaxPct(config) => self.tax_rate = config.rate(),
        }
    }

    fn add_discount(&mut self, amount: Decimal) {
        self.discount_total = self
            .discount_total
            .checked_add(amount)
            .unwrap_or(Decimal::MAX);
    }

    fn finish(self, subtotal: Decimal) -> Evaluation {
        let applied = self.discount_total.min(subtotal);
        let discounted_subtotal = (subtotal - applied).max(Decimal::ZERO);
        let tax = discounted_subtotal
            .checked_mul(self.tax_rate.max(Decimal::ZERO))
            .unwrap_or(Decimal::MAX);
        let total = discounted_subtotal
            .checked_add(tax)
            .unwrap_or(Decimal::MAX);

        Evaluation {
            subtotal,
            discount: subtotal - discounted_subtotal,
            tax,
            total,
            violations: self.violations,
        }
    }
}

/// Price a cart against an organization's untrusted rule records.
///
/// Rules are applied in list order; violations are reported in that order and the last
/// `tax_pct` rule sets the tax rate. `fallback_tax_rate` (a fraction, `0.21` for 21%)
/// applies when no `tax_pct` rule is present and defaults to zero.
#[tracing::instrument(
    name = "pricing.evaluate",
    level = "debug",
    skip_all,
    fields(items = items.len(), rules = rules.len())
)]
pub fn evaluate_pricing(
    items: &[LineItem],
    rules: &[RawRule],
    fallback_tax_rate: Option<Decimal>,
) -> Evaluation {
    let state = SelectionState::from_items(items);
    let mut accumulator = Accumulator::new(fallback_tax_rate);

    for raw in rules {
        match PricingRule::parse_with(raw, ParseMode::Lenient) {
            Ok(rule) => accumulator.apply(&rule, &state),
            Err(err) => debug!(
                rule_id = %raw.id,
                rule_type = %raw.rule_type,
                error = %err,
                "skipping pricing rule"
            ),
        }
    }

    finish(items, accumulator)
}

/// Price a cart against rules that were already parsed or validated.
#[tracing::instrument(
    name = "pricing.evaluate_rules",
    level = "debug",
    skip_all,
    fields(items = items.len(), rules = rules.len())
)]
pub fn evaluate_rules(
    items: &[LineItem],
    rules: &[PricingRule],
    fallback_tax_rate: Option<Decimal>,
) -> Evaluation {
    let state = SelectionState::from_items(items);
    let mut accumulator = Accumulator::new(fallback_tax_rate);

    for rule in rules {
        accumulator.apply(rule, &state);
    }

    finish(items, accumulator)
}

fn finish(items: &[LineItem], accumulator: Accumulator) -> Evaluation {
    let evaluation = accumulator.finish(sum_line_totals(items));

    debug!(
        subtotal = %evaluation.subtotal,
        discount = %evaluation.discount,
        tax = %evaluation.tax,
        total = %evaluation.total,
        violations = evaluation.violations.len(),
        "priced cart"
    );

    evaluation
}
