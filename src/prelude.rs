//! Proposal pricing prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    fixtures::{Fixture, FixtureError},
    items::LineItem,
    pricing::{Evaluation, Violation, evaluate_pricing, evaluate_rules},
    quote::{
        Catalog, CatalogOption, DepositPolicy, MAX_OPTION_QUANTITY, OptionCatalog, QuoteError,
        QuoteTotals, Selection, SelectionError, price_selections, resolve_line_items,
        validate_selections,
    },
    receipt::{QuoteReceipt, ReceiptError},
    rules::{
        PricingRule, RawRule, RuleConfig, RuleKind, RuleMeta,
        config::ParseMode,
        errors::{RuleConfigError, RuleSetErrors},
    },
    selection::{AppliesTo, Requirement, SelectionState, Trigger},
    tags::{collection::TagCollection, string::StringTagCollection},
    validation::{validate_rule, validate_rules},
};
