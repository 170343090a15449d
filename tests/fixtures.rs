//! Fixture-driven quotes.
//!
//! The `proposal` set selects `core-a` (1200.00), `lighting-pro` (980.00), four
//! `uplighting` (150.00 each) and zero `photo-booth`, for a subtotal of 2780.00.
//!
//! - Add-on bundle: 10% of the add-ons (600.00) because `core-a` is selected: 60.00
//! - Volume: 5% tier of 2780.00: 139.00
//! - Returning client: 50.00, since `dj` and `premium` are both selected
//! - VAT 21% of 2531.00: 531.51
//!
//! The `loyalty_points` rule is unknown and ignored.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use testresult::TestResult;

use proposal_pricing::{
    fixtures::Fixture,
    quote::{DepositPolicy, QuoteError, QuoteTotals},
    rules::errors::RuleConfigError,
    validation::validate_rules,
};

#[test]
fn proposal_set_prices_every_rule() -> TestResult {
    let fixture = Fixture::from_set("proposal")?;

    let evaluation = fixture.price()?;

    assert_eq!(evaluation.subtotal(), dec!(2780));
    assert_eq!(evaluation.discount(), dec!(249));
    assert_eq!(evaluation.tax(), dec!(531.51));
    assert_eq!(evaluation.total(), dec!(3062.51));

    let totals = QuoteTotals::from_evaluation(
        &evaluation,
        DepositPolicy::Percentage(dec!(30)),
        fixture.currency()?,
    );

    assert_eq!(totals.deposit, dec!(918.75));
    assert_eq!(totals.currency, "EUR");

    Ok(())
}

#[test]
fn zero_quantity_option_stays_in_the_quote() -> TestResult {
    let fixture = Fixture::from_set("proposal")?;

    let items = fixture.line_items()?;
    let booth = items.iter().find(|item| item.option_id() == "photo-booth");

    assert_eq!(items.len(), 4);
    assert!(booth.is_some_and(|item| !item.is_selected()));

    Ok(())
}

#[test]
fn conflicting_selection_is_blocked() -> TestResult {
    let mut fixture = Fixture::new();
    fixture
        .load_options("proposal")?
        .load_selections("conflict")?
        .load_rules("proposal")?;

    let evaluation = fixture.evaluate()?;
    assert_eq!(evaluation.violations().len(), 1);

    match fixture.price() {
        Err(QuoteError::Blocked {
            message,
            violations,
        }) => {
            assert_eq!(message, "Lighting package allows only one of the conflicting options");
            assert_eq!(violations, evaluation.violations());
        }
        other => panic!("expected a blocked quote, got {other:?}"),
    }

    Ok(())
}

#[test]
fn missing_core_is_blocked_by_requirement() -> TestResult {
    let mut fixture = Fixture::new();
    fixture
        .load_options("proposal")?
        .load_selections("missing-core")?
        .load_rules("proposal")?;

    let evaluation = fixture.evaluate()?;
    let ids: Vec<&str> = evaluation
        .violations()
        .iter()
        .map(|violation| violation.rule_id.as_str())
        .collect();

    assert_eq!(ids, ["premium-lighting"]);
    assert_eq!(evaluation.subtotal(), dec!(1280));
    assert!(evaluation.discount() > Decimal::ZERO);

    Ok(())
}

#[test]
fn strict_validation_flags_the_unknown_rule() -> TestResult {
    let fixture = Fixture::from_set("proposal")?;

    let errors = validate_rules(fixture.rules()).err().map(|errors| errors.0);

    assert_eq!(
        errors,
        Some(vec![RuleConfigError::UnknownType {
            rule_id: "points".to_string(),
            rule_type: "loyalty_points".to_string(),
        }])
    );

    Ok(())
}
