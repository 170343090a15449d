//! Quote
//!
//! Prices a fixture set and prints the receipt or the quote as JSON. Exits non-zero when a
//! rule blocks the quote.
//!
//! Use `-f` to load a fixture set by name
//! Use `-s` to price a different selection set against the same options and rules
//! Use `-o json` for machine-readable output

use std::{
    io::{self, Write},
    process::ExitCode,
    time::Instant,
};

use anyhow::Result;
use humanize_duration::{Truncate, prelude::DurationExt};
use serde::Serialize;
use tracing::{error, info};

use proposal_pricing::{
    fixtures::Fixture,
    items::LineItem,
    pricing::{Evaluation, evaluate_pricing},
    quote::{DepositPolicy, QuoteTotals},
    receipt::QuoteReceipt,
    validation::validate_rules,
};

use crate::config::{OutputFormat, QuoteConfig};

mod config;
mod logging;

/// JSON shape of a priced quote.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteOutput<'a> {
    items: &'a [LineItem],
    evaluation: &'a Evaluation,
    totals: QuoteTotals,
}

/// Quote entry point
fn main() -> Result<ExitCode> {
    let config = match QuoteConfig::load() {
        Ok(config) => config,
        Err(err) => err.exit(),
    };

    logging::init_subscriber(&config.logging)?;

    let mut fixture = Fixture::with_base_path(&config.fixtures_dir);

    fixture
        .load_options(&config.fixture)?
        .load_selections(config.selection_set())?
        .load_rules(&config.fixture)?;

    if config.strict
        && let Err(errors) = validate_rules(fixture.rules())
    {
        for err in &errors.0 {
            error!(%err, "invalid pricing rule");
        }

        return Err(errors.into());
    }

    let items = fixture.line_items()?;
    let fallback_tax_rate = config.fallback_tax_rate.or(fixture.fallback_tax_rate());

    let start = Instant::now();
    let evaluation = evaluate_pricing(&items, fixture.rules(), fallback_tax_rate);
    let elapsed = start.elapsed();

    info!(
        fixture = %config.fixture,
        selections = %config.selection_set(),
        violations = evaluation.violations().len(),
        elapsed = %elapsed.human(Truncate::Nano),
        "priced quote"
    );

    let currency = match &config.currency {
        Some(currency) => currency.clone(),
        None => fixture.currency()?.to_string(),
    };
    let deposit = config
        .deposit_pct
        .map_or(DepositPolicy::None, DepositPolicy::Percentage);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match config.output {
        OutputFormat::Table => {
            QuoteReceipt::new(&items, &evaluation, deposit, currency).write_to(&mut handle)?;

            writeln!(
                handle,
                " {} ({}s)",
                elapsed.human(Truncate::Nano),
                elapsed.as_secs_f32()
            )?;
        }
        OutputFormat::Json => {
            let output = QuoteOutput {
                items: &items,
                evaluation: &evaluation,
                totals: QuoteTotals::from_evaluation(&evaluation, deposit, currency),
            };

            serde_json::to_writer_pretty(&mut handle, &output)?;
            writeln!(handle)?;
        }
    }

    if evaluation.has_violations() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
