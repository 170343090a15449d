//! Fixtures
//!
//! Named YAML fixture sets used by the tests and the `quote` binary. A set is split across
//! three files sharing a name:
//!
//! - `options/<name>.yml`: the currency and catalog options
//! - `selections/<name>.yml`: what the client picked
//! - `rules/<name>.yml`: the organization's pricing rules and fallback tax rate

use std::{fs, path::PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    items::LineItem,
    pricing::{Evaluation, evaluate_pricing},
    quote::{Catalog, CatalogOption, QuoteError, Selection, price_selections, resolve_line_items},
    rules::RawRule,
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Currency mismatch between option files
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No options loaded yet
    #[error("No options loaded yet; currency unknown")]
    NoCurrency,

    /// The selections could not be resolved against the catalog
    #[error(transparent)]
    Quote(#[from] QuoteError),
}

#[derive(Debug, Deserialize)]
struct OptionsFixture {
    currency: String,
    options: Vec<CatalogOption>,
}

#[derive(Debug, Deserialize)]
struct SelectionsFixture {
    selections: Vec<Selection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RulesFixture {
    #[serde(default)]
    fallback_tax_rate: Option<Decimal>,
    #[serde(default)]
    rules: Vec<RawRule>,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    catalog: Catalog,
    selections: Vec<Selection>,
    rules: Vec<RawRule>,
    fallback_tax_rate: Option<Decimal>,

    /// Currency label for the fixture set
    currency: Option<String>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::default(),
            selections: Vec::new(),
            rules: Vec::new(),
            fallback_tax_rate: None,
            currency: None,
        }
    }

    fn read(&self, category: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));

        Ok(fs::read_to_string(file_path)?)
    }

    /// Load catalog options from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if its currency differs
    /// from options loaded earlier.
    pub fn load_options(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: OptionsFixture = serde_norway::from_str(&self.read("options", name)?)?;

        if let Some(existing) = &self.currency {
            if *existing != fixture.currency {
                return Err(FixtureError::CurrencyMismatch(
                    existing.clone(),
                    fixture.currency,
                ));
            }
        } else {
            self.currency = Some(fixture.currency);
        }

        for option in fixture.options {
            self.catalog.insert(option);
        }

        Ok(self)
    }

    /// Load client selections from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_selections(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: SelectionsFixture = serde_norway::from_str(&self.read("selections", name)?)?;

        self.selections.extend(fixture.selections);

        Ok(self)
    }

    /// Load pricing rules from a YAML fixture file
    ///
    /// A fallback tax rate in the file replaces any loaded earlier.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_rules(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: RulesFixture = serde_norway::from_str(&self.read("rules", name)?)?;

        if fixture.fallback_tax_rate.is_some() {
            self.fallback_tax_rate = fixture.fallback_tax_rate;
        }

        self.rules.extend(fixture.rules);

        Ok(self)
    }

    /// Load a complete fixture set (options, selections, and rules with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_options(name)?
            .load_selections(name)?
            .load_rules(name)?;

        Ok(fixture)
    }

    /// Get the option catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get all selections
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    /// Get all rules
    pub fn rules(&self) -> &[RawRule] {
        &self.rules
    }

    /// Get the fallback tax rate, if the rules file set one
    pub fn fallback_tax_rate(&self) -> Option<Decimal> {
        self.fallback_tax_rate
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no options have been loaded yet.
    pub fn currency(&self) -> Result<&str, FixtureError> {
        self.currency.as_deref().ok_or(FixtureError::NoCurrency)
    }

    /// Resolve the selections into line items
    ///
    /// # Errors
    ///
    /// Returns an error if a selection is malformed or names an unknown option.
    pub fn line_items(&self) -> Result<Vec<LineItem>, FixtureError> {
        Ok(resolve_line_items(&self.catalog, &self.selections)?)
    }

    /// Evaluate the selections against the rules, violations included
    ///
    /// # Errors
    ///
    /// Returns an error if the selections cannot be resolved.
    pub fn evaluate(&self) -> Result<Evaluation, FixtureError> {
        Ok(evaluate_pricing(
            &self.line_items()?,
            &self.rules,
            self.fallback_tax_rate,
        ))
    }

    /// Price the selections as a quote, failing when a rule blocks it
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::Blocked`] if a rule is violated, or another [`QuoteError`] if
    /// the selections cannot be resolved.
    pub fn price(&self) -> Result<Evaluation, QuoteError> {
        price_selections(
            &self.catalog,
            &self.selections,
            &self.rules,
            self.fallback_tax_rate,
        )
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::quote::OptionCatalog;

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn loads_a_set_from_a_custom_path() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "options",
            "mini",
            "currency: GBP\noptions:\n  - optionId: a\n    catalogPrice: \"10.50\"\n    tags: [x]\n",
        )?;
        write_fixture(
            dir.path(),
            "selections",
            "mini",
            "selections:\n  - optionId: a\n    qty: 2\n",
        )?;
        write_fixture(
            dir.path(),
            "rules",
            "mini",
            "fallbackTaxRate: \"0.2\"\nrules:\n  - id: d\n    type: discount_fixed\n    config:\n      amount: 1\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        fixture
            .load_options("mini")?
            .load_selections("mini")?
            .load_rules("mini")?;

        assert_eq!(fixture.currency()?, "GBP");
        assert_eq!(
            fixture.catalog().option("a").map(CatalogOption::unit_price),
            Some(dec!(10.50))
        );

        let evaluation = fixture.price()?;

        assert_eq!(evaluation.subtotal(), dec!(21));
        assert_eq!(evaluation.discount(), dec!(1));
        assert_eq!(evaluation.tax(), dec!(4));
        assert_eq!(evaluation.total(), dec!(24));

        Ok(())
    }

    #[test]
    fn currency_mismatch_is_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(dir.path(), "options", "eur", "currency: EUR\noptions: []\n")?;
        write_fixture(dir.path(), "options", "usd", "currency: USD\noptions: []\n")?;

        let mut fixture = Fixture::with_base_path(dir.path());
        fixture.load_options("eur")?;

        assert!(matches!(
            fixture.load_options("usd"),
            Err(FixtureError::CurrencyMismatch(expected, found)) if expected == "EUR" && found == "USD"
        ));

        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut fixture = Fixture::with_base_path("./does-not-exist");

        assert!(matches!(
            fixture.load_rules("nothing"),
            Err(FixtureError::Io(_))
        ));
        assert!(matches!(fixture.currency(), Err(FixtureError::NoCurrency)));
    }
}
