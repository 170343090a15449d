//! End-to-end pricing scenarios for a DJ/lighting proposal.
//!
//! Catalog used throughout:
//!
//! - `core-a`: 1200.00, tags `core`, `dj`
//! - `lighting-pro`: 980.00, tags `lighting`, `premium`
//! - `lighting-basic`: 550.00, tags `lighting`

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use proposal_pricing::{
    items::LineItem, pricing::evaluate_pricing, rules::RawRule,
    tags::string::StringTagCollection,
};

fn core_a(qty: i64) -> LineItem {
    LineItem::with_tags(
        "core-a",
        qty,
        dec!(1200),
        StringTagCollection::from_strs(&["core", "dj"]),
    )
}

fn lighting_pro(qty: i64) -> LineItem {
    LineItem::with_tags(
        "lighting-pro",
        qty,
        dec!(980),
        StringTagCollection::from_strs(&["lighting", "premium"]),
    )
}

fn lighting_basic(qty: i64) -> LineItem {
    LineItem::with_tags(
        "lighting-basic",
        qty,
        dec!(550),
        StringTagCollection::from_strs(&["lighting"]),
    )
}

fn lighting_needs_core() -> RawRule {
    RawRule::new(
        "r1",
        "require",
        json!({ "triggerOptionIds": ["lighting-pro"], "requiredOptionIds": ["core-a"] }),
    )
}

#[test]
fn satisfied_requirement_has_no_violations() {
    let items = [core_a(1), lighting_pro(1), lighting_basic(0)];

    let result = evaluate_pricing(&items, &[lighting_needs_core()], None);

    assert!(result.violations().is_empty(), "{:?}", result.violations());
    assert_eq!(result.subtotal(), dec!(2180));
}

#[test]
fn missing_requirement_is_reported() {
    let items = [core_a(0), lighting_pro(1), lighting_basic(0)];

    let result = evaluate_pricing(&items, &[lighting_needs_core()], None);

    assert_eq!(result.violations().len(), 1);
    assert!(
        result
            .first_violation()
            .is_some_and(|violation| violation.message.contains("requires")),
        "{:?}",
        result.violations()
    );
    assert_eq!(result.subtotal(), dec!(980));
}

#[test]
fn conflicting_lighting_packages_are_reported_once() {
    let items = [core_a(1), lighting_pro(1), lighting_basic(1)];
    let rules = [RawRule::new(
        "r2",
        "mutex",
        json!({ "optionIds": ["lighting-pro", "lighting-basic"] }),
    )];

    let result = evaluate_pricing(&items, &rules, None);

    assert_eq!(result.violations().len(), 1);
    assert_eq!(
        result.first_violation().map(|violation| violation.rule_id.as_str()),
        Some("r2")
    );
}

#[test]
fn percent_discount_then_tax() {
    let items = [core_a(1), lighting_basic(1)];
    let rules = [
        RawRule::new(
            "d1",
            "discount_pct",
            json!({ "triggerTags": ["dj", "lighting"], "percentage": 10 }),
        ),
        RawRule::new("t1", "tax_pct", json!({ "percentage": 21 })),
    ];

    let result = evaluate_pricing(&items, &rules, None);

    assert_eq!(result.subtotal(), dec!(1750));
    assert_eq!(result.discount(), dec!(175));
    assert_eq!(result.tax(), dec!(330.75));
    assert_eq!(result.total(), dec!(1905.75));
}

#[test]
fn tag_trigger_needs_every_tag() {
    let items = [core_a(1)];
    let rules = [RawRule::new(
        "d1",
        "discount_pct",
        json!({ "triggerTags": ["dj", "lighting"], "percentage": 10 }),
    )];

    let result = evaluate_pricing(&items, &rules, None);

    assert_eq!(result.discount(), Decimal::ZERO);
}

#[test]
fn threshold_tier_follows_eligible_subtotal() {
    let rules = [RawRule::new(
        "d1",
        "discount_threshold_pct",
        json!({
            "thresholds": [
                { "minimum": 1500, "percentage": 8 },
                { "minimum": 2500, "percentage": 12 }
            ],
            "appliesToTags": ["dj", "lighting"]
        }),
    )];

    let result = evaluate_pricing(&[core_a(1), lighting_basic(1)], &rules, None);
    assert_eq!(result.discount(), dec!(140));

    let result = evaluate_pricing(
        &[core_a(1), lighting_basic(1), lighting_pro(1)],
        &rules,
        None,
    );
    assert_eq!(result.discount(), dec!(327.6));
}

#[test]
fn applies_to_limits_the_discount_base() {
    let items = [core_a(1), lighting_basic(1)];
    let rules = [RawRule::new(
        "d1",
        "discount_pct",
        json!({ "percentage": 10, "appliesToOptionIds": ["lighting-basic"] }),
    )];

    let result = evaluate_pricing(&items, &rules, None);

    assert_eq!(result.discount(), dec!(55));
    assert_eq!(result.total(), dec!(1695));
}

#[test]
fn last_tax_rule_wins() {
    let items = [core_a(1), lighting_basic(1)];
    let rules = [
        RawRule::new("t1", "tax_pct", json!({ "percentage": 10 })),
        RawRule::new("t2", "tax_pct", json!({ "percentage": 20 })),
    ];

    let result = evaluate_pricing(&items, &rules, Some(dec!(0.05)));

    assert_eq!(result.tax(), dec!(350));
}

#[test]
fn unknown_rule_types_change_nothing() {
    let items = [core_a(1), lighting_pro(1), lighting_basic(1)];
    let base = [
        RawRule::new("mx", "mutex", json!({ "tags": ["lighting"] })),
        RawRule::new("d1", "discount_fixed", json!({ "amount": 100 })),
        RawRule::new("t1", "tax_pct", json!({ "percentage": 21 })),
    ];
    let mut with_unknown = base.to_vec();
    with_unknown.insert(
        1,
        RawRule::new("x", "bundle_price", json!({ "price": 1 })),
    );

    assert_eq!(
        evaluate_pricing(&items, &base, None),
        evaluate_pricing(&items, &with_unknown, None)
    );
}

#[test]
fn stacked_discounts_never_exceed_subtotal() {
    let items = [core_a(1)];
    let rules = [
        RawRule::new("d1", "discount_fixed", json!({ "amount": 1000 })),
        RawRule::new("d2", "discount_fixed", json!({ "amount": 1000 })),
        RawRule::new("t1", "tax_pct", json!({ "percentage": 21 })),
    ];

    let result = evaluate_pricing(&items, &rules, None);

    assert_eq!(result.discount(), dec!(1200));
    assert_eq!(result.tax(), Decimal::ZERO);
    assert_eq!(result.total(), Decimal::ZERO);
}

#[test]
fn empty_cart_prices_to_zero() {
    let rules = [
        RawRule::new("d1", "discount_fixed", json!({ "amount": 50 })),
        RawRule::new("t1", "tax_pct", json!({ "percentage": 21 })),
    ];

    let result = evaluate_pricing(&[], &rules, None);

    assert_eq!(result.subtotal(), Decimal::ZERO);
    assert_eq!(result.discount(), Decimal::ZERO);
    assert_eq!(result.total(), Decimal::ZERO);
}

#[test]
fn negative_inputs_are_floored() {
    let items = [
        LineItem::new("refund", 1, dec!(-300)),
        LineItem::new("returns", -2, dec!(100)),
        core_a(1),
    ];

    let result = evaluate_pricing(&items, &[], None);

    assert_eq!(result.subtotal(), dec!(1200));
}
