//! `gouge-chart` library crate.
//!
//! The binary (`gouge`) is a thin wrapper around this library so that:
//!
//! - the chart pipeline is testable without spawning processes
//! - modules are reusable (e.g., a web front-end consuming the exported JSON)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod chart;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
