//! Validation
//!
//! Strict checks for rule authoring. Where [`crate::pricing::evaluate_pricing`] silently
//! skips what it cannot use, these functions report every problem so an organization can
//! fix its rules before they reach a quote.

use rustc_hash::FxHashSet;

use crate::rules::{
    PricingRule, RawRule,
    config::ParseMode,
    errors::{RuleConfigError, RuleSetErrors},
};

/// Validate one rule record.
///
/// # Errors
///
/// Returns the first [`RuleConfigError`] found: a blank id, an unknown type, or a config
/// that does not match its type's schema exactly.
pub fn validate_rule(raw: &RawRule) -> Result<PricingRule, RuleConfigError> {
    if raw.id.trim().is_empty() {
        return Err(RuleConfigError::MissingId);
    }

    PricingRule::parse_with(raw, ParseMode::Strict)
}

/// Validate a whole rule set, collecting every error rather than stopping at the first.
///
/// # Errors
///
/// Returns [`RuleSetErrors`] listing one error per invalid rule plus one per repeated id,
/// in rule order.
pub fn validate_rules(rules: &[RawRule]) -> Result<Vec<PricingRule>, RuleSetErrors> {
    let mut seen = FxHashSet::default();
    let mut parsed = Vec::with_capacity(rules.len());
    let mut errors = Vec::new();

    for raw in rules {
        let id = raw.id.trim();

        if !id.is_empty() && !seen.insert(id) {
            errors.push(RuleConfigError::DuplicateId {
                rule_id: id.to_string(),
            });
        }

        match validate_rule(raw) {
            Ok(rule) => parsed.push(rule),
            Err(err) => errors.push(err),
        }
    }

    if errors.is_empty() {
        Ok(parsed)
    } else {
        Err(RuleSetErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn blank_id_is_rejected() {
        let raw = RawRule::new("  ", "tax_pct", json!({ "percentage": 21 }));

        assert_eq!(validate_rule(&raw), Err(RuleConfigError::MissingId));
    }

    #[test]
    fn strict_mode_rejects_what_lenient_drops() {
        let raw = RawRule::new(
            "d1",
            "discount_pct",
            json!({ "percentage": 10, "appliesToTags": ["lighting", " "] }),
        );

        assert!(PricingRule::parse(&raw).is_some());
        assert_eq!(
            validate_rule(&raw),
            Err(RuleConfigError::InvalidListEntry {
                rule_id: "d1".to_string(),
                field: "appliesToTags",
                index: 1,
            })
        );
    }

    #[test]
    fn valid_set_parses_in_order() {
        let rules = [
            RawRule::new("mx", "mutex", json!({ "tags": ["lighting"] })),
            RawRule::new("vat", "tax_pct", json!({ "percentage": 21 })),
        ];

        let parsed = validate_rules(&rules);

        assert_eq!(
            parsed.map(|rules| rules.iter().map(|rule| rule.meta().id().to_string()).collect::<Vec<_>>()),
            Ok(vec!["mx".to_string(), "vat".to_string()])
        );
    }

    #[test]
    fn set_collects_every_error() {
        let rules = [
            RawRule::new("d1", "discount_fixed", json!({ "amount": -5 })),
            RawRule::new("d1", "tax_pct", json!({ "percentage": 21 })),
            RawRule::new("x", "bundle", json!({})),
        ];

        let Err(RuleSetErrors(errors)) = validate_rules(&rules) else {
            panic!("expected validation errors");
        };

        assert_eq!(
            errors,
            vec![
                RuleConfigError::NotPositive {
                    rule_id: "d1".to_string(),
                    field: "amount",
                },
                RuleConfigError::DuplicateId {
                    rule_id: "d1".to_string(),
                },
                RuleConfigError::UnknownType {
                    rule_id: "x".to_string(),
                    rule_type: "bundle".to_string(),
                },
            ]
        );
    }
}
