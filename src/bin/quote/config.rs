//! Quote CLI configuration

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use rust_decimal::Decimal;

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Quote output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Receipt table.
    Table,

    /// Pretty-printed JSON.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Price a proposal fixture set
#[derive(Debug, Parser)]
#[command(name = "quote", about = "Price a proposal fixture set", long_about = None)]
pub struct QuoteConfig {
    /// Fixture set providing options, selections and rules
    #[arg(short, long, env = "QUOTE_FIXTURE", default_value = "proposal")]
    pub fixture: String,

    /// Selection set to price instead of the fixture set's own
    #[arg(short, long, env = "QUOTE_SELECTIONS")]
    pub selections: Option<String>,

    /// Directory holding the fixture sets
    #[arg(long, env = "QUOTE_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Tax rate as a fraction (0.21 for 21%) used when no tax rule applies
    #[arg(short = 't', long, env = "QUOTE_FALLBACK_TAX_RATE")]
    pub fallback_tax_rate: Option<Decimal>,

    /// Deposit due up front, as a percentage of the total
    #[arg(short, long, env = "QUOTE_DEPOSIT_PCT")]
    pub deposit_pct: Option<Decimal>,

    /// Currency label shown on the receipt, overriding the fixture's
    #[arg(short, long, env = "QUOTE_CURRENCY")]
    pub currency: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, env = "QUOTE_OUTPUT", value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Reject the run if any rule fails strict validation
    #[arg(long, env = "QUOTE_STRICT", default_value_t = false)]
    pub strict: bool,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl QuoteConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Name of the selection set to load
    pub fn selection_set(&self) -> &str {
        self.selections.as_deref().unwrap_or(&self.fixture)
    }
}
