//! Rule Configuration Errors

use thiserror::Error;

/// Reasons a rule configuration cannot be turned into a typed rule.
///
/// The evaluator treats every one of these as "skip the rule". Authoring tools surface them
/// through [`crate::validation::validate_rule`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleConfigError {
    /// The rule has an empty identifier.
    #[error("rule is missing an id")]
    MissingId,

    /// Another rule in the same set already uses this identifier.
    #[error("rule id {rule_id} is used more than once")]
    DuplicateId {
        /// Offending rule.
        rule_id: String,
    },

    /// The `type` string is not a known rule kind.
    #[error("rule {rule_id} has unknown type {rule_type:?}")]
    UnknownType {
        /// Offending rule.
        rule_id: String,
        /// The unrecognised type string.
        rule_type: String,
    },

    /// `config` is not a key-value map.
    #[error("rule {rule_id} config must be an object")]
    ConfigNotObject {
        /// Offending rule.
        rule_id: String,
    },

    /// A required field is absent.
    #[error("rule {rule_id} is missing {field}")]
    MissingField {
        /// Offending rule.
        rule_id: String,
        /// Config key.
        field: &'static str,
    },

    /// A numeric field could not be parsed.
    #[error("rule {rule_id} has a non-numeric {field}")]
    InvalidNumber {
        /// Offending rule.
        rule_id: String,
        /// Config key.
        field: &'static str,
    },

    /// A numeric field must be greater than zero.
    #[error("rule {rule_id} requires {field} to be greater than zero")]
    NotPositive {
        /// Offending rule.
        rule_id: String,
        /// Config key.
        field: &'static str,
    },

    /// A numeric field must not be negative.
    #[error("rule {rule_id} requires {field} to be zero or more")]
    Negative {
        /// Offending rule.
        rule_id: String,
        /// Config key.
        field: &'static str,
    },

    /// A list field holds something other than a list.
    #[error("rule {rule_id} requires {field} to be a list")]
    InvalidList {
        /// Offending rule.
        rule_id: String,
        /// Config key.
        field: &'static str,
    },

    /// A list entry is not a non-blank string.
    #[error("rule {rule_id} has an invalid entry at {field}[{index}]")]
    InvalidListEntry {
        /// Offending rule.
        rule_id: String,
        /// Config key.
        field: &'static str,
        /// Position of the entry.
        index: usize,
    },

    /// The rule lists nothing to act on.
    #[error("rule {rule_id} has no {what}")]
    EmptyRule {
        /// Offending rule.
        rule_id: String,
        /// What is missing.
        what: &'static str,
    },

    /// A threshold tier entry is malformed.
    #[error("rule {rule_id} has an invalid tier at thresholds[{index}]: {reason}")]
    InvalidTier {
        /// Offending rule.
        rule_id: String,
        /// Position of the tier.
        index: usize,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Every error found while validating a rule set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{} invalid rule configuration(s)", .0.len())]
pub struct RuleSetErrors(pub Vec<RuleConfigError>);
