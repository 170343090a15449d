//! Mutex Rule
//!
//! "Only one of A/B": at most one distinct option may be selected among the listed options
//! and the options carrying any listed tag.

use rustc_hash::FxHashSet;

use crate::{
    rules::{RuleMeta, config::ConfigReader, errors::RuleConfigError},
    selection::{OptionIds, SelectionState},
    tags::{collection::TagCollection, string::StringTagCollection},
};

const DEFAULT_MESSAGE: &str = "Only one of the conflicting options may be selected";

/// Typed config for a `mutex` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutexConfig {
    /// Options that exclude each other.
    pub option_ids: OptionIds,

    /// Options carrying any of these tags exclude each other.
    pub tags: StringTagCollection,
}

impl MutexConfig {
    pub(crate) fn parse(reader: &ConfigReader<'_>) -> Result<Self, RuleConfigError> {
        let option_ids = reader.strings("optionIds")?;
        let tags = reader.tags("tags")?;

        if option_ids.is_empty() && tags.is_empty() {
            return Err(RuleConfigError::EmptyRule {
                rule_id: reader.rule_id(),
                what: "options or tags",
            });
        }

        Ok(Self { option_ids, tags })
    }

    /// Distinct selected option ids caught by the rule.
    pub fn conflicting_options<'a>(&self, state: &SelectionState<'a>) -> FxHashSet<&'a str> {
        state
            .selected_items()
            .filter(|item| {
                self.option_ids.iter().any(|id| id == item.option_id())
                    || item.tags().intersects(&self.tags)
            })
            .map(|item| item.option_id())
            .collect()
    }

    /// Whether more than one distinct option is caught by the rule.
    pub fn is_violated(&self, state: &SelectionState<'_>) -> bool {
        self.conflicting_options(state).len() > 1
    }

    /// Human-readable violation message for the rule.
    pub fn message(meta: &RuleMeta) -> String {
        meta.name().map_or_else(
            || DEFAULT_MESSAGE.to_string(),
            |name| format!("{name} allows only one of the conflicting options"),
        )
    }
}
