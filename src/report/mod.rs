//! Reporting utilities: money formatting and listing summaries.

pub mod format;

pub use format::*;
