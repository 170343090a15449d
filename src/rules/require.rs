//! Require Rule
//!
//! "Option X requires option Y": once triggered, every required option and tag must be
//! part of the selection.

use crate::{
    rules::{RuleMeta, config::ConfigReader, errors::RuleConfigError},
    selection::{Requirement, SelectionState, Trigger},
};

const DEFAULT_MESSAGE: &str = "A selected option requires an additional selection";

/// Typed config for a `require` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireConfig {
    /// What activates the requirement.
    pub trigger: Trigger,

    /// What must then be selected.
    pub requirement: Requirement,
}

impl RequireConfig {
    pub(crate) fn parse(reader: &ConfigReader<'_>) -> Result<Self, RuleConfigError> {
        let trigger = reader.trigger()?;
        let requirement = reader.requirement()?;

        if trigger.is_empty() {
            return Err(RuleConfigError::EmptyRule {
                rule_id: reader.rule_id(),
                what: "trigger options or tags",
            });
        }

        if requirement.is_empty() {
            return Err(RuleConfigError::EmptyRule {
                rule_id: reader.rule_id(),
                what: "required options or tags",
            });
        }

        Ok(Self {
            trigger,
            requirement,
        })
    }

    /// Whether the rule is triggered and its requirement unmet.
    pub fn is_violated(&self, state: &SelectionState<'_>) -> bool {
        state.is_triggered(&self.trigger) && !state.satisfies(&self.requirement)
    }

    /// Human-readable violation message for the rule.
    pub fn message(meta: &RuleMeta) -> String {
        meta.name().map_or_else(
            || DEFAULT_MESSAGE.to_string(),
            |name| format!("{name} requires an additional selection"),
        )
    }
}
