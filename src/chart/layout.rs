//! Label placement, axis range and x ticks.

use std::collections::HashSet;

use crate::domain::{AxisRange, Ceiling, ChartRules, PriceLabel, Series, XTick};
use crate::report::fmt_dollars;

/// Short tick format, e.g. `01/07/25`.
pub const TICK_FORMAT: &str = "%m/%d/%y";

/// Vertical label offset for position `i` of `n`.
///
/// First point goes up (lead-in), last point goes down, everything between
/// alternates: even indices up, odd indices down. A single point counts as first.
pub fn label_offset(i: usize, n: usize, rules: &ChartRules) -> i32 {
    if i == 0 {
        rules.label_lead_offset
    } else if i + 1 == n {
        rules.label_tail_offset
    } else if i % 2 == 0 {
        rules.label_offset
    } else {
        -rules.label_offset
    }
}

/// One label per distinct date; the first observation seen at a date wins.
///
/// Offsets use the observation's position in the full series, so suppression
/// never shifts the alternation of the labels that remain.
pub fn resolve_labels(series: &Series, rules: &ChartRules) -> Vec<PriceLabel> {
    let n = series.len();
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(n);

    for (i, p) in series.points().iter().enumerate() {
        if !seen.insert(p.date) {
            continue;
        }
        out.push(PriceLabel {
            date: p.date,
            price: p.price,
            label: p.label,
            text: fmt_dollars(p.price),
            y_offset: label_offset(i, n, rules),
        });
    }
    out
}

/// Y range that keeps every price, the ceiling and the band top visible.
pub fn axis_range(series: &Series, ceiling: Option<Ceiling>, rules: &ChartRules) -> AxisRange {
    let min_p = series.min_price();
    let max_p = series.max_price();

    let (mut y_min, mut y_max) = match ceiling {
        Some(c) => (
            (min_p * rules.axis_price_low).min(c.value() * rules.axis_ceiling_low),
            (max_p * rules.axis_price_high).max(c.value() * rules.axis_ceiling_high),
        ),
        None => (min_p * rules.axis_price_low, max_p * rules.axis_price_high),
    };

    let pad = ((y_max - y_min) * rules.axis_pad).max(rules.axis_min_pad);
    y_min -= pad;
    y_max += pad;

    AxisRange { y_min, y_max }
}

/// One tick per observation date plus the emergency date (appended last).
///
/// Positions are not de-duplicated; an observation on the emergency date yields
/// two ticks at the same x.
pub fn x_ticks(series: &Series, rules: &ChartRules) -> Vec<XTick> {
    series
        .points()
        .iter()
        .map(|p| p.date)
        .chain(std::iter::once(rules.emergency_date))
        .map(|date| XTick {
            date,
            text: date.format(TICK_FORMAT).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::chart::normalize::{normalize_series, validate_ceiling};
    use crate::domain::{GougingRule, RawHistory, RawObservation};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn raw(d: NaiveDate, price: f64) -> RawObservation {
        RawObservation {
            date: Some(d),
            price: Some(price),
        }
    }

    fn series_of(points: [(NaiveDate, f64); 4]) -> Series {
        let history = RawHistory {
            base: raw(points[0].0, points[0].1),
            first_gouged: raw(points[1].0, points[1].1),
            emergency_peak: raw(points[2].0, points[2].1),
            latest: raw(points[3].0, points[3].1),
        };
        normalize_series(GougingRule::Tenpercent.series_labels().unwrap(), &history).unwrap()
    }

    fn scenario() -> Series {
        series_of([
            (date(2023, 1, 1), 1000.0),
            (date(2025, 2, 1), 1300.0),
            (date(2025, 3, 1), 1500.0),
            (date(2025, 4, 1), 1400.0),
        ])
    }

    #[test]
    fn four_point_offsets_alternate_with_boundary_exceptions() {
        let rules = ChartRules::default();
        let labels = resolve_labels(&scenario(), &rules);
        let offsets: Vec<i32> = labels.iter().map(|l| l.y_offset).collect();
        assert_eq!(offsets, vec![30, -20, 20, -30]);
        assert_eq!(labels[2].text, "$1,500");
    }

    #[test]
    fn three_point_offsets() {
        let rules = ChartRules::default();
        let got: Vec<i32> = (0..3).map(|i| label_offset(i, 3, &rules)).collect();
        assert_eq!(got, vec![30, -20, -30]);
        assert_eq!(label_offset(0, 1, &rules), 30);
    }

    #[test]
    fn same_date_labels_are_suppressed() {
        let d = date(2025, 2, 1);
        let series = series_of([(d, 1000.0), (d, 1300.0), (d, 1500.0), (d, 1400.0)]);
        let labels = resolve_labels(&series, &ChartRules::default());
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].text, "$1,000");
    }

    #[test]
    fn axis_range_with_ceiling() {
        let ceiling = validate_ceiling(Some(1100.0)).unwrap();
        let r = axis_range(&scenario(), ceiling, &ChartRules::default());
        // raw bounds: min(700, 880) = 700, max(1950, 1320) = 1950; pad = 125
        assert!((r.y_min - 575.0).abs() < 1e-9);
        assert!((r.y_max - 2075.0).abs() < 1e-9);
        assert!(r.y_min <= 700.0 && r.y_max >= 1950.0);
    }

    #[test]
    fn axis_range_without_ceiling_uses_prices_only() {
        let r = axis_range(&scenario(), None, &ChartRules::default());
        assert!((r.y_min - 575.0).abs() < 1e-9);
        assert!((r.y_max - 2075.0).abs() < 1e-9);
    }

    #[test]
    fn high_ceiling_stretches_the_top() {
        let ceiling = validate_ceiling(Some(2000.0)).unwrap();
        let r = axis_range(&scenario(), ceiling, &ChartRules::default());
        assert!(r.contains_strictly(2000.0));
        assert!(r.y_max > 2400.0);
    }

    #[test]
    fn flat_zero_series_still_has_a_span() {
        let d = date(2025, 2, 1);
        let series = series_of([(d, 0.0), (d, 0.0), (d, 0.0), (d, 0.0)]);
        let r = axis_range(&series, None, &ChartRules::default());
        assert!(r.contains_strictly(0.0));
    }

    #[test]
    fn ticks_append_emergency_date() {
        let ticks = x_ticks(&scenario(), &ChartRules::default());
        assert_eq!(ticks.len(), 5);
        assert_eq!(ticks[0].text, "01/01/23");
        assert_eq!(ticks[4].date, date(2025, 1, 7));
        assert_eq!(ticks[4].text, "01/07/25");
    }

    #[test]
    fn observation_on_emergency_date_doubles_the_tick() {
        let emergency = date(2025, 1, 7);
        let series = series_of([
            (date(2023, 1, 1), 1000.0),
            (emergency, 1300.0),
            (date(2025, 3, 1), 1500.0),
            (date(2025, 4, 1), 1400.0),
        ]);
        let ticks = x_ticks(&series, &ChartRules::default());
        assert_eq!(ticks.len(), 5);
        let on_emergency: Vec<&XTick> = ticks.iter().filter(|t| t.date == emergency).collect();
        assert_eq!(on_emergency.len(), 2);
        assert!(on_emergency.iter().all(|t| t.text == "01/07/25"));
        assert_eq!(ticks[1].date, ticks[4].date);
    }
}
