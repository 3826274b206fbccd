//! Export a resolved chart to JSON.
//!
//! The JSON is the hand-off format for an external rendering surface
//! (web page, notebook, etc.). The schema is defined by `domain::ChartSpec`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::{ChartSpec, ListingView, UNKNOWN_RULE_MESSAGE};
use crate::error::AppError;

/// Chart file written by `gouge export`.
#[derive(Debug, Clone, Serialize)]
pub struct ChartFile<'a> {
    pub tool: &'static str,
    pub listing_id: &'a str,
    pub gouging_rule: &'static str,
    pub price_ceiling: Option<f64>,
    pub chart: &'a ChartSpec,
}

impl<'a> ChartFile<'a> {
    /// Fails when the listing has no chart (unknown gouging rule).
    pub fn from_view(view: &'a ListingView) -> Result<Self, AppError> {
        let chart = view
            .chart
            .as_ref()
            .ok_or_else(|| AppError::new(3, UNKNOWN_RULE_MESSAGE))?;
        Ok(Self {
            tool: "gouge",
            listing_id: &view.record.listing_id,
            gouging_rule: view.rule.display_name(),
            price_ceiling: view.ceiling.map(|c| c.value()),
            chart,
        })
    }
}

/// Write the chart JSON to `path`, or to stdout when `path` is `None`.
pub fn write_chart_json(path: Option<&Path>, view: &ListingView) -> Result<(), AppError> {
    let file = ChartFile::from_view(view)?;
    match path {
        Some(path) => {
            let out = File::create(path)
                .map_err(|e| AppError::new(2, format!("Failed to create chart JSON '{}': {e}", path.display())))?;
            serde_json::to_writer_pretty(out, &file)
                .map_err(|e| AppError::new(2, format!("Failed to write chart JSON: {e}")))?;
            info!(path = %path.display(), "chart exported");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &file)
                .map_err(|e| AppError::new(2, format!("Failed to write chart JSON: {e}")))?;
            writeln!(stdout).map_err(|e| AppError::new(2, format!("Failed to write chart JSON: {e}")))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_view;
    use crate::domain::{ChartRules, ListingRecord};

    #[test]
    fn chart_file_serializes_dates_and_optional_parts() {
        let record = ListingRecord {
            listing_id: "L9".to_string(),
            gouging_rule: Some("fmr".to_string()),
            latest_price: Some(2400.0),
            latest_price_date: Some("2025-02-10".to_string()),
            ..ListingRecord::default()
        };
        let view = build_view(record, &ChartRules::default()).unwrap();
        let json = serde_json::to_value(ChartFile::from_view(&view).unwrap()).unwrap();

        assert_eq!(json["listing_id"], "L9");
        assert_eq!(json["gouging_rule"], "FMR");
        assert!(json["price_ceiling"].is_null());
        assert!(json["chart"]["shaded_region"].is_null());
        assert_eq!(json["chart"]["line"][0][0], "2025-02-10");
        assert_eq!(json["chart"]["emergency_line"]["date"], "2025-01-07");
        assert_eq!(json["chart"]["labels"][0]["label"], "current");
        assert_eq!(json["chart"]["x_ticks"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn unknown_rule_has_nothing_to_export() {
        let record = ListingRecord {
            listing_id: "L10".to_string(),
            gouging_rule: Some("rentcontrol".to_string()),
            ..ListingRecord::default()
        };
        let view = build_view(record, &ChartRules::default()).unwrap();
        let err = ChartFile::from_view(&view).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "Unknown gouging rule; unable to calculate ceiling.");
    }
}
