//! Tags
//!
//! Free-form string labels attached to catalog options and matched by pricing rules.

pub mod collection;
pub mod string;
