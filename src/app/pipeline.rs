//! Shared "listing -> chart" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! lookup -> rule -> raw history -> series + ceiling -> chart
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::{info, warn};

use crate::chart::{build_chart, normalize_series, validate_ceiling};
use crate::domain::{ChartRules, ListingRecord, ListingView};
use crate::error::AppError;
use crate::io::listing::{ListingStore, raw_history, resolve_ceiling};

/// Find a listing and build its view.
pub fn lookup_view(store: &ListingStore, listing_id: &str, rules: &ChartRules) -> Result<ListingView, AppError> {
    let record = store
        .find(listing_id)
        .cloned()
        .ok_or_else(|| AppError::new(3, "No listing found with that ID."))?;
    build_view(record, rules)
}

/// Turn one stored record into a resolved view.
///
/// An unknown rule still yields a view (so the summary can be shown) but no
/// ceiling and no chart.
pub fn build_view(record: ListingRecord, rules: &ChartRules) -> Result<ListingView, AppError> {
    let rule = record.rule();
    let history = raw_history(&record)?;

    let Some(labels) = rule.series_labels() else {
        warn!(listing_id = %record.listing_id, rule = ?record.gouging_rule, "unknown gouging rule; chart skipped");
        return Ok(ListingView {
            record,
            rule,
            history,
            ceiling: None,
            chart: None,
        });
    };

    let series = normalize_series(labels, &history)?;
    let ceiling = validate_ceiling(resolve_ceiling(&record, rule, rules))?;
    let chart = build_chart(&series, ceiling, rules);

    info!(
        listing_id = %record.listing_id,
        rule = rule.display_name(),
        points = series.len(),
        ceiling = ceiling.map(|c| c.value()),
        "listing charted"
    );

    Ok(ListingView {
        record,
        rule,
        history,
        ceiling,
        chart: Some(chart),
    })
}
