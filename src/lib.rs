//! Proposal Pricing
//!
//! A small, deterministic rule engine for pricing proposals: given the options a client
//! selected and an organization's pricing rules, it computes subtotal, discount, tax and
//! total, and reports selection rules (requirements and mutual exclusions) the cart breaks.
//!
//! Rules are untrusted data. Malformed or unknown rules are skipped by
//! [`pricing::evaluate_pricing`] and reported in full by [`validation::validate_rules`].

pub mod fixtures;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod quote;
pub mod receipt;
pub mod rules;
pub mod selection;
pub mod tags;
pub mod validation;
