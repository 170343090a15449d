//! Tax Rule

use rust_decimal::Decimal;

use crate::rules::{config::ConfigReader, errors::RuleConfigError};

/// Typed config for a `tax_pct` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxConfig {
    /// Tax percentage (`21` means 21%).
    pub percentage: Decimal,
}

impl TaxConfig {
    pub(crate) fn parse(reader: &ConfigReader<'_>) -> Result<Self, RuleConfigError> {
        Ok(Self {
            percentage: reader.non_negative("percentage")?,
        })
    }

    /// The rate as a fraction (`0.21` for 21%), the unit the fallback tax rate is given in.
    pub fn rate(&self) -> Decimal {
        self.percentage
            .checked_div(Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ZERO)
    }
}
