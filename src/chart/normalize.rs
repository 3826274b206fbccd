//! Series normalization: raw listing slots -> ordered `Series`.
//!
//! The caller's label order is authoritative. Observations are never re-sorted
//! by date, because the regulatory event order (Base, First Gouge, Peak, Current)
//! is what the chart tells.

use tracing::warn;

use crate::domain::{Ceiling, Observation, ObservationLabel, RawHistory, Series};
use crate::error::ChartError;

/// Build a series from the raw slots named by `labels`, in that order.
///
/// A slot with a missing date or price is skipped rather than charted as a gap.
/// Prices that are negative or non-finite are treated as missing.
pub fn normalize_series(labels: &[ObservationLabel], history: &RawHistory) -> Result<Series, ChartError> {
    let mut points = Vec::with_capacity(labels.len());

    for &label in labels {
        let raw = history.get(label);
        let (Some(date), Some(price)) = (raw.date, raw.price) else {
            continue;
        };
        if !(price.is_finite() && price >= 0.0) {
            warn!(label = label.display_name(), price, "dropping unusable price");
            continue;
        }
        points.push(Observation { date, price, label });
    }

    if points.is_empty() {
        return Err(ChartError::InvalidSeries);
    }
    Ok(Series::from_points(points))
}

/// Reject ceilings that cannot be charted honestly.
pub fn validate_ceiling(raw: Option<f64>) -> Result<Option<Ceiling>, ChartError> {
    match raw {
        None => Ok(None),
        Some(v) if v.is_finite() && v > 0.0 => Ok(Some(Ceiling(v))),
        Some(v) => Err(ChartError::InvalidCeiling(v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::{GougingRule, RawObservation};

    fn obs(y: i32, m: u32, d: u32, price: f64) -> RawObservation {
        RawObservation {
            date: NaiveDate::from_ymd_opt(y, m, d),
            price: Some(price),
        }
    }

    fn full_history() -> RawHistory {
        RawHistory {
            base: obs(2023, 1, 1, 1000.0),
            first_gouged: obs(2025, 2, 1, 1300.0),
            emergency_peak: obs(2025, 3, 1, 1500.0),
            latest: obs(2025, 4, 1, 1400.0),
        }
    }

    #[test]
    fn tenpercent_keeps_base_and_input_order() {
        let labels = GougingRule::Tenpercent.series_labels().unwrap();
        let series = normalize_series(labels, &full_history()).unwrap();
        let got: Vec<ObservationLabel> = series.points().iter().map(|p| p.label).collect();
        assert_eq!(
            got,
            vec![
                ObservationLabel::Base,
                ObservationLabel::FirstGouge,
                ObservationLabel::Peak,
                ObservationLabel::Current
            ]
        );
    }

    #[test]
    fn fmr_omits_base() {
        let labels = GougingRule::Fmr.series_labels().unwrap();
        let series = normalize_series(labels, &full_history()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.points()[0].label, ObservationLabel::FirstGouge);
    }

    #[test]
    fn out_of_order_dates_are_not_resorted() {
        let mut history = full_history();
        history.latest = obs(2024, 6, 1, 1200.0);
        let labels = GougingRule::Tenpercent.series_labels().unwrap();
        let series = normalize_series(labels, &history).unwrap();
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[test]
    fn missing_halves_drop_the_point() {
        let mut history = full_history();
        history.first_gouged.price = None;
        history.emergency_peak.date = None;
        let labels = GougingRule::Tenpercent.series_labels().unwrap();
        let series = normalize_series(labels, &history).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[1].label, ObservationLabel::Current);
    }

    #[test]
    fn empty_series_is_an_error() {
        let labels = GougingRule::Fmr.series_labels().unwrap();
        let history = RawHistory {
            base: obs(2023, 1, 1, 1000.0),
            ..RawHistory::default()
        };
        assert_eq!(normalize_series(labels, &history), Err(ChartError::InvalidSeries));
    }

    #[test]
    fn negative_and_nan_prices_are_dropped() {
        let mut history = full_history();
        history.base.price = Some(-1.0);
        history.latest.price = Some(f64::NAN);
        let labels = GougingRule::Tenpercent.series_labels().unwrap();
        let series = normalize_series(labels, &history).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn ceiling_validation() {
        assert_eq!(validate_ceiling(None), Ok(None));
        assert_eq!(validate_ceiling(Some(1100.0)).unwrap().map(Ceiling::value), Some(1100.0));
        assert_eq!(validate_ceiling(Some(0.0)), Err(ChartError::InvalidCeiling(0.0)));
        assert!(validate_ceiling(Some(f64::INFINITY)).is_err());
    }
}
