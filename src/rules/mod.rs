//! Pricing Rules
//!
//! Rules arrive as loosely-typed records ([`RawRule`]) straight from storage: a `type`
//! string and an arbitrary `config` map. [`PricingRule::parse`] turns one into a typed
//! [`RuleConfig`] variant, or returns nothing when the record is malformed or of an
//! unknown type.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::rules::{
    config::{ConfigReader, ParseMode},
    discounts::{FixedDiscountConfig, PercentDiscountConfig, ThresholdDiscountConfig},
    errors::RuleConfigError,
    mutex::MutexConfig,
    require::RequireConfig,
    tax::TaxConfig,
};

pub mod config;
pub mod discounts;
pub mod errors;
pub mod mutex;
pub mod require;
pub mod tax;

/// The recognised rule types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Selection dependency.
    Require,

    /// Mutual exclusion.
    Mutex,

    /// Fixed amount off.
    DiscountFixed,

    /// Percentage off.
    DiscountPct,

    /// Percentage off picked from spend tiers.
    DiscountThresholdPct,

    /// Tax rate.
    TaxPct,
}

impl RuleKind {
    /// The storage name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Require => "require",
            Self::Mutex => "mutex",
            Self::DiscountFixed => "discount_fixed",
            Self::DiscountPct => "discount_pct",
            Self::DiscountThresholdPct => "discount_threshold_pct",
            Self::TaxPct => "tax_pct",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `type` string that names no known rule kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown rule type {0:?}")]
pub struct UnknownRuleKind(pub String);

impl FromStr for RuleKind {
    type Err = UnknownRuleKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "require" => Ok(Self::Require),
            "mutex" => Ok(Self::Mutex),
            "discount_fixed" => Ok(Self::DiscountFixed),
            "discount_pct" => Ok(Self::DiscountPct),
            "discount_threshold_pct" => Ok(Self::DiscountThresholdPct),
            "tax_pct" => Ok(Self::TaxPct),
            other => Err(UnknownRuleKind(other.to_string())),
        }
    }
}

/// A rule as stored by the organization: untrusted shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRule {
    /// Identifier used to tag violations.
    #[serde(default)]
    pub id: String,

    /// Rule type string, e.g. `discount_pct`.
    #[serde(rename = "type", default)]
    pub rule_type: String,

    /// Optional label for violation messages.
    #[serde(default)]
    pub name: Option<String>,

    /// Type-specific settings.
    #[serde(default)]
    pub config: Value,
}

impl RawRule {
    /// Create a raw rule record.
    pub fn new(id: impl Into<String>, rule_type: impl Into<String>, config: Value) -> Self {
        Self {
            id: id.into(),
            rule_type: rule_type.into(),
            name: None,
            config,
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Identity and label of a rule, carried into violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMeta {
    id: String,
    name: Option<String>,
}

impl RuleMeta {
    /// Create rule metadata. Blank names are treated as absent.
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        let name = name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Self {
            id: id.into(),
            name,
        }
    }

    /// Rule identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rule name, if it has a non-blank one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Strongly-typed settings, one variant per rule kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleConfig {
    /// `require`
    Require(RequireConfig),

    /// `mutex`
    Mutex(MutexConfig),

    /// `discount_fixed`
    DiscountFixed(FixedDiscountConfig),

    /// `discount_pct`
    DiscountPct(PercentDiscountConfig),

    /// `discount_threshold_pct`
    DiscountThresholdPct(ThresholdDiscountConfig),

    /// `tax_pct`
    TaxPct(TaxConfig),
}

impl RuleConfig {
    /// The kind of the config.
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::Require(_) => RuleKind::Require,
            Self::Mutex(_) => RuleKind::Mutex,
            Self::DiscountFixed(_) => RuleKind::DiscountFixed,
            Self::DiscountPct(_) => RuleKind::DiscountPct,
            Self::DiscountThresholdPct(_) => RuleKind::DiscountThresholdPct,
            Self::TaxPct(_) => RuleKind::TaxPct,
        }
    }
}

/// A parsed, evaluable pricing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingRule {
    meta: RuleMeta,
    config: RuleConfig,
}

impl PricingRule {
    /// Create a rule from already-typed parts.
    pub fn new(meta: RuleMeta, config: RuleConfig) -> Self {
        Self { meta, config }
    }

    /// Parse an untrusted record, returning `None` on any shape mismatch or unknown type.
    pub fn parse(raw: &RawRule) -> Option<Self> {
        Self::parse_with(raw, ParseMode::Lenient).ok()
    }

    /// Parse an untrusted record in the given mode, reporting why it was rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleConfigError`] if the type is unknown or the config does not fit
    /// the type's schema.
    pub fn parse_with(raw: &RawRule, mode: ParseMode) -> Result<Self, RuleConfigError> {
        let kind = raw
            .rule_type
            .parse::<RuleKind>()
            .map_err(|UnknownRuleKind(rule_type)| RuleConfigError::UnknownType {
                rule_id: raw.id.clone(),
                rule_type,
            })?;

        let reader = ConfigReader::new(&raw.id, &raw.config, mode)?;

        let config = match kind {
            RuleKind::Require => RuleConfig::Require(RequireConfig::parse(&reader)?),
            RuleKind::Mutex => RuleConfig::Mutex(MutexConfig::parse(&reader)?),
            RuleKind::DiscountFixed => {
                RuleConfig::DiscountFixed(FixedDiscountConfig::parse(&reader)?)
            }
            RuleKind::DiscountPct => RuleConfig::DiscountPct(PercentDiscountConfig::parse(&reader)?),
            RuleKind::DiscountThresholdPct => {
                RuleConfig::DiscountThresholdPct(ThresholdDiscountConfig::parse(&reader)?)
            }
            RuleKind::TaxPct => RuleConfig::TaxPct(TaxConfig::parse(&reader)?),
        };

        Ok(Self {
            meta: RuleMeta::new(raw.id.clone(), raw.name.clone()),
            config,
        })
    }

    /// Rule identity and label.
    pub fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    /// Typed settings.
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// The kind of the rule.
    pub fn kind(&self) -> RuleKind {
        self.config.kind()
    }
}
