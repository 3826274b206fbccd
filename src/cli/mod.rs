//! Command-line parsing for the listing chart viewer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the chart code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{ChartRules, FMR_MULTIPLIER, TEN_PERCENT_MULTIPLIER};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gouge", version, about = "Rent-gouging price history viewer")]
pub struct Cli {
    /// Log pipeline details to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the listing summary and an ASCII price-history chart.
    Show(ShowArgs),
    /// Write the resolved chart description as JSON.
    Export(ExportArgs),
    /// Launch the interactive TUI.
    Tui(TuiArgs),
}

/// Where listings come from and which jurisdictional constants apply.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Listings file (.json or .csv). Defaults to $GOUGE_LISTINGS (.env is honored).
    #[arg(short = 'l', long, value_name = "FILE")]
    pub listings: Option<PathBuf>,

    /// Date the emergency declaration took effect (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub emergency_date: Option<NaiveDate>,

    /// FMR rule multiplier used when a listing has no stored ceiling.
    #[arg(long, default_value_t = FMR_MULTIPLIER)]
    pub fmr_multiplier: f64,

    /// Ten-percent rule multiplier used when a listing has no stored ceiling.
    #[arg(long, default_value_t = TEN_PERCENT_MULTIPLIER)]
    pub ten_percent_multiplier: f64,
}

impl SourceArgs {
    pub fn chart_rules(&self) -> ChartRules {
        let defaults = ChartRules::default();
        ChartRules {
            emergency_date: self.emergency_date.unwrap_or(defaults.emergency_date),
            fmr_multiplier: self.fmr_multiplier,
            ten_percent_multiplier: self.ten_percent_multiplier,
            ..defaults
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Listing identifier.
    pub listing_id: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Skip the ASCII chart.
    #[arg(long)]
    pub no_plot: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Listing identifier.
    pub listing_id: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Output path (stdout when omitted).
    #[arg(short, long, value_name = "JSON")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    /// Listing to open on start.
    pub listing_id: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
