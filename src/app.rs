//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initializes logging
//! - loads the listing store
//! - builds the chart for the requested listing
//! - prints summaries/plots, writes exports, or runs the TUI

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ExportArgs, ShowArgs, SourceArgs, TuiArgs};
use crate::error::AppError;
use crate::io::listing::ListingStore;

pub mod pipeline;

const LISTINGS_ENV: &str = "GOUGE_LISTINGS";

/// Entry point for the `gouge` binary.
pub fn run() -> Result<(), AppError> {
    // We want `gouge` and `gouge 12345` to behave like `gouge tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_logging(&cli.command, cli.verbose);

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Export(args) => handle_export(args),
        Command::Tui(args) => handle_tui(args),
    }
}

/// Log to stderr. The TUI owns the terminal, so it stays silent unless RUST_LOG asks.
fn init_logging(command: &Command, verbose: bool) {
    let default_level = match command {
        Command::Tui(_) => "off",
        _ if verbose => "debug",
        _ => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let rules = args.source.chart_rules();
    let store = load_store(&args.source)?;
    let view = pipeline::lookup_view(&store, &args.listing_id, &rules)?;

    println!("{}", crate::report::format_listing_summary(&view, &rules));
    if let Some(chart) = view.chart.as_ref().filter(|_| !args.no_plot) {
        println!("{}", crate::plot::render_ascii_chart(chart, args.width, args.height));
    }
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let rules = args.source.chart_rules();
    let store = load_store(&args.source)?;
    let view = pipeline::lookup_view(&store, &args.listing_id, &rules)?;
    crate::io::export::write_chart_json(args.out.as_deref(), &view)
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let rules = args.source.chart_rules();
    let store = load_store(&args.source)?;
    crate::tui::run(store, rules, args.listing_id)
}

fn load_store(source: &SourceArgs) -> Result<ListingStore, AppError> {
    let path = listings_path(source.listings.clone())?;
    ListingStore::load(&path)
}

/// `--listings` wins; otherwise `GOUGE_LISTINGS` from the environment or `.env`.
fn listings_path(flag: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(path) = flag {
        return Ok(path);
    }
    dotenvy::dotenv().ok();
    std::env::var(LISTINGS_ENV)
        .map(PathBuf::from)
        .map_err(|_| AppError::new(2, format!("No listings file: pass --listings or set {LISTINGS_ENV} (.env).")))
}

/// Rewrite argv so `gouge` defaults to `gouge tui`.
///
/// Rules:
/// - `gouge`                      -> `gouge tui`
/// - `gouge 12345 ...`            -> `gouge tui 12345 ...`
/// - `gouge -l x.json ...`        -> `gouge tui -l x.json ...`
/// - `gouge --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    // A leading flag (other than -v) or a bare listing id means "tui".
    if arg1 == "-v" || arg1 == "--verbose" {
        return argv;
    }
    argv.insert(1, "tui".to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocations_default_to_tui() {
        assert_eq!(rewrite_args(argv(&["gouge"])), argv(&["gouge", "tui"]));
        assert_eq!(rewrite_args(argv(&["gouge", "123"])), argv(&["gouge", "tui", "123"]));
        assert_eq!(
            rewrite_args(argv(&["gouge", "-l", "x.csv"])),
            argv(&["gouge", "tui", "-l", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["gouge", "show", "1"])), argv(&["gouge", "show", "1"]));
        assert_eq!(rewrite_args(argv(&["gouge", "--help"])), argv(&["gouge", "--help"]));
        assert_eq!(rewrite_args(argv(&["gouge", "-v", "show", "1"])), argv(&["gouge", "-v", "show", "1"]));
    }

    #[test]
    fn explicit_listings_flag_wins() {
        let p = listings_path(Some(PathBuf::from("a.json"))).unwrap();
        assert_eq!(p, PathBuf::from("a.json"));
    }
}
