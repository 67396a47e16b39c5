//! Shared utilities for the consolidation crates.
//!
//! This crate provides the numeric text helpers used when cells move between
//! their display form (CSV text) and their typed form.

pub mod numeric;

// Re-export commonly used functions at crate root for convenience
pub use numeric::{format_numeric, is_currency_symbol, parse_f64, strip_numeric_decorations};
