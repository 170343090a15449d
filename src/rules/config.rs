//! Untrusted Config Parsing
//!
//! Reads typed fields out of an organization-authored `config` map. Rule-level problems
//! (missing or non-numeric fields, lists that are not lists of strings) are always errors;
//! what differs between modes is how blank list entries and malformed tiers are handled.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::{
    rules::errors::RuleConfigError,
    selection::{AppliesTo, OptionIds, Requirement, Trigger},
    tags::string::StringTagCollection,
};

/// How forgiving parsing is about individual list entries and tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Drop blank list entries and malformed tiers and keep going. Used by the evaluator.
    #[default]
    Lenient,

    /// Reject the rule on the first malformed entry. Used at the authoring boundary.
    Strict,
}

/// Field accessor over one rule's config map.
#[derive(Debug)]
pub(crate) struct ConfigReader<'a> {
    rule_id: &'a str,
    map: &'a Map<String, Value>,
    mode: ParseMode,
}

impl<'a> ConfigReader<'a> {
    pub(crate) fn new(
        rule_id: &'a str,
        config: &'a Value,
        mode: ParseMode,
    ) -> Result<Self, RuleConfigError> {
        let map = config
            .as_object()
            .ok_or_else(|| RuleConfigError::ConfigNotObject {
                rule_id: rule_id.to_string(),
            })?;

        Ok(Self { rule_id, map, mode })
    }

    pub(crate) fn rule_id(&self) -> String {
        self.rule_id.to_string()
    }

    pub(crate) fn mode(&self) -> ParseMode {
        self.mode
    }

    /// A list of non-blank, trimmed strings. Missing or `null` is an empty list.
    ///
    /// A value that is not an array, or an entry that is not a string, fails the rule in
    /// either mode. Only blank entries are mode-dependent.
    pub(crate) fn strings(&self, field: &'static str) -> Result<OptionIds, RuleConfigError> {
        let entries = match self.map.get(field) {
            None | Some(Value::Null) => return Ok(OptionIds::new()),
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(RuleConfigError::InvalidList {
                    rule_id: self.rule_id(),
                    field,
                });
            }
        };

        let mut strings = OptionIds::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let invalid = || RuleConfigError::InvalidListEntry {
                rule_id: self.rule_id(),
                field,
                index,
            };

            let value = entry.as_str().map(str::trim).ok_or_else(invalid)?;

            if value.is_empty() {
                if self.mode == ParseMode::Strict {
                    return Err(invalid());
                }
            } else if !strings.iter().any(|existing| existing == value) {
                strings.push(value.to_string());
            }
        }

        Ok(strings)
    }

    /// Same as [`Self::strings`], collected into a tag set.
    pub(crate) fn tags(&self, field: &'static str) -> Result<StringTagCollection, RuleConfigError> {
        Ok(self.strings(field)?.into_iter().collect())
    }

    /// A required number.
    pub(crate) fn number(&self, field: &'static str) -> Result<Decimal, RuleConfigError> {
        match self.map.get(field) {
            None | Some(Value::Null) => Err(RuleConfigError::MissingField {
                rule_id: self.rule_id(),
                field,
            }),
            Some(value) => {
                parse_number(value).ok_or_else(|| RuleConfigError::InvalidNumber {
                    rule_id: self.rule_id(),
                    field,
                })
            }
        }
    }

    /// A required number strictly above zero.
    pub(crate) fn positive(&self, field: &'static str) -> Result<Decimal, RuleConfigError> {
        let value = self.number(field)?;

        if value > Decimal::ZERO {
            Ok(value)
        } else {
            Err(RuleConfigError::NotPositive {
                rule_id: self.rule_id(),
                field,
            })
        }
    }

    /// A required number of zero or more.
    pub(crate) fn non_negative(&self, field: &'static str) -> Result<Decimal, RuleConfigError> {
        let value = self.number(field)?;

        if value >= Decimal::ZERO {
            Ok(value)
        } else {
            Err(RuleConfigError::Negative {
                rule_id: self.rule_id(),
                field,
            })
        }
    }

    /// The raw value under `field`, if any.
    pub(crate) fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field)
    }

    /// `triggerOptionIds` and `triggerTags`.
    pub(crate) fn trigger(&self) -> Result<Trigger, RuleConfigError> {
        Ok(Trigger {
            option_ids: self.strings("triggerOptionIds")?,
            tags: self.tags("triggerTags")?,
        })
    }

    /// `requiredOptionIds` and `requiredTags`.
    pub(crate) fn requirement(&self) -> Result<Requirement, RuleConfigError> {
        Ok(Requirement {
            option_ids: self.strings("requiredOptionIds")?,
            tags: self.tags("requiredTags")?,
        })
    }

    /// `appliesToOptionIds` and `appliesToTags`.
    pub(crate) fn applies_to(&self) -> Result<AppliesTo, RuleConfigError> {
        Ok(AppliesTo {
            option_ids: self.strings("appliesToOptionIds")?,
            tags: self.tags("appliesToTags")?,
        })
    }
}

/// Parse a JSON number or numeric string into a decimal.
///
/// Exponent notation is accepted; booleans, blank strings and anything else are not.
pub(crate) fn parse_number(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text.trim()),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }

    Decimal::from_str(text)
        .or_else(|_err| Decimal::from_scientific(text))
        .ok()
}
