//! Receipt
//!
//! Terminal rendering of a priced quote: one row per line item, a totals summary, and the
//! rules blocking the quote if any.

use std::{fmt::Write, io};

use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    items::LineItem,
    pricing::{Evaluation, Violation},
    quote::{DepositPolicy, QuoteTotals},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing to the output failed.
    #[error("failed to write receipt")]
    Io(#[from] io::Error),
}

/// A priced quote ready to print.
#[derive(Debug, Clone)]
pub struct QuoteReceipt<'a> {
    items: &'a [LineItem],
    violations: &'a [Violation],
    totals: QuoteTotals,
}

impl<'a> QuoteReceipt<'a> {
    /// Build a receipt for the items and their evaluation.
    pub fn new(
        items: &'a [LineItem],
        evaluation: &'a Evaluation,
        deposit: DepositPolicy,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            items,
            violations: evaluation.violations(),
            totals: QuoteTotals::from_evaluation(evaluation, deposit, currency),
        }
    }

    /// Rounded totals shown in the summary.
    pub fn totals(&self) -> &QuoteTotals {
        &self.totals
    }

    /// Whether the quote is blocked by a rule.
    pub fn is_blocked(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Write the receipt.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Option", "Tags", "Qty", "Unit Price", "Line Total"]);

        let mut unselected_rows = Vec::new();

        for (idx, item) in self.items.iter().enumerate() {
            let line_total = if item.is_selected() {
                self.money(item.line_total())
            } else {
                unselected_rows.push(idx + 1);
                String::from("-")
            };

            builder.push_record([
                format!("#{:<3}", idx + 1),
                item.option_id().to_string(),
                item.tags().to_strs().join("\n"),
                item.qty().to_string(),
                self.money(item.unit_price()),
                line_total,
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..6), Alignment::right());
        table.modify(Columns::new(2..3), color_dark_grey());

        for row in unselected_rows {
            for col in 0..6 {
                table.modify((row, col), color_dark_grey());
            }
        }

        writeln!(out, "\n{}", colorize_borders(&table.to_string()))?;

        self.write_summary(&mut out)?;

        if self.is_blocked() {
            self.write_violations(&mut out)?;
        }

        Ok(())
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let totals = &self.totals;

        let mut lines = vec![
            SummaryLine::new("Subtotal", self.money(totals.subtotal)),
            SummaryLine::new("Discount", format!("-{}", self.money(totals.discount))),
            SummaryLine::new("Tax", self.money(totals.tax)),
            SummaryLine::new("Total", self.money(totals.total)).bold(),
        ];

        if totals.deposit > Decimal::ZERO {
            lines.push(SummaryLine::new("Deposit", self.money(totals.deposit)));
        }

        let label_width = lines
            .iter()
            .map(|line| line.label.chars().count())
            .max()
            .unwrap_or_default();

        let amount_width = lines
            .iter()
            .map(|line| line.amount.chars().count())
            .max()
            .unwrap_or_default();

        for line in &lines {
            line.write_to(out, label_width, amount_width)?;
        }

        writeln!(out)?;

        Ok(())
    }

    fn write_violations(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Rule", "Blocked Because"]);

        for violation in self.violations {
            builder.push_record([
                violation
                    .rule_name
                    .clone()
                    .unwrap_or_else(|| violation.rule_id.clone()),
                violation.message.clone(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..2), Color::FG_RED);

        writeln!(out, "{}\n", colorize_borders(&table.to_string()))?;

        Ok(())
    }

    fn money(&self, amount: Decimal) -> String {
        format!("{amount:.2} {}", self.totals.currency)
    }
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// One labelled amount in the totals block.
#[derive(Debug)]
struct SummaryLine {
    label: String,
    amount: String,
    bold: bool,
}

impl SummaryLine {
    fn new(label: &str, amount: String) -> Self {
        Self {
            label: format!("{label}:"),
            amount,
            bold: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Right-aligns the label and the amount within their columns.
    fn write_to(
        &self,
        out: &mut impl io::Write,
        label_width: usize,
        amount_width: usize,
    ) -> Result<(), ReceiptError> {
        let label_pad = label_width.saturating_sub(self.label.chars().count());
        let amount_pad = amount_width.saturating_sub(self.amount.chars().count());
        let (on, off) = if self.bold { ("\x1b[1m", "\x1b[0m") } else { ("", "") };

        writeln!(
            out,
            " {:label_pad$}{on}{label}{off}  {:amount_pad$}{on}{amount}{off}  ",
            "",
            "",
            label = self.label,
            amount = self.amount,
        )?;

        Ok(())
    }
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
