//! Price-history chart construction.
//!
//! Three pure stages run in order:
//!
//! - `normalize`: raw listing slots -> ordered `Series` (+ validated `Ceiling`)
//! - `geometry`: line, drop lines, violation band, ceiling/emergency references
//! - `layout`: label offsets, y-axis range, x ticks
//!
//! Either a complete `ChartSpec` comes out or an error does; nothing partial.

pub mod geometry;
pub mod layout;
pub mod normalize;

use tracing::debug;

use crate::domain::{Ceiling, ChartRules, ChartSpec, Series};

pub use geometry::build_geometry;
pub use layout::{axis_range, label_offset, resolve_labels, x_ticks};
pub use normalize::{normalize_series, validate_ceiling};

/// Build the full chart description for a series and optional ceiling.
pub fn build_chart(series: &Series, ceiling: Option<Ceiling>, rules: &ChartRules) -> ChartSpec {
    let geometry = build_geometry(series, ceiling, rules);
    let labels = resolve_labels(series, rules);
    let axis_range = axis_range(series, ceiling, rules);
    let x_ticks = x_ticks(series, rules);

    debug!(
        points = series.len(),
        labels = labels.len(),
        shaded = geometry.shaded_region.is_some(),
        y_min = axis_range.y_min,
        y_max = axis_range.y_max,
        "chart built"
    );

    ChartSpec {
        line: geometry.line,
        drop_lines: geometry.drop_lines,
        shaded_region: geometry.shaded_region,
        ceiling_line: geometry.ceiling_line,
        emergency_line: geometry.emergency_line,
        labels,
        axis_range,
        x_ticks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::{GougingRule, RawHistory, RawObservation};

    #[test]
    fn shared_date_keeps_geometry_but_one_label() {
        let d = NaiveDate::from_ymd_opt(2025, 2, 1);
        let raw = |price| RawObservation { date: d, price: Some(price) };
        let history = RawHistory {
            base: raw(1000.0),
            first_gouged: raw(1300.0),
            emergency_peak: raw(1500.0),
            latest: raw(1400.0),
        };
        let series = normalize_series(GougingRule::Tenpercent.series_labels().unwrap(), &history).unwrap();
        let ceiling = validate_ceiling(Some(1100.0)).unwrap();
        let spec = build_chart(&series, ceiling, &ChartRules::default());

        assert_eq!(spec.line.len(), 4);
        assert_eq!(spec.drop_lines.len(), 4);
        assert_eq!(spec.labels.len(), 1);
        assert_eq!(spec.x_ticks.len(), 5);
        let band = spec.shaded_region.unwrap();
        assert_eq!(band.start, band.end);
        assert!(spec.axis_range.contains_strictly(band.top));
    }
}
