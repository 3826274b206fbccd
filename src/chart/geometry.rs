//! Geometry derivation: line, drop lines, violation band and reference lines.

use chrono::NaiveDate;

use crate::domain::{
    Ceiling, CeilingLine, ChartGeometry, ChartRules, DropLine, EmergencyLine, Series, ShadedRegion,
};
use crate::report::fmt_dollars;

/// Derive every drawable element of the chart except labels and axis bounds.
pub fn build_geometry(series: &Series, ceiling: Option<Ceiling>, rules: &ChartRules) -> ChartGeometry {
    let line: Vec<(NaiveDate, f64)> = series.points().iter().map(|p| (p.date, p.price)).collect();

    let drop_lines = series
        .points()
        .iter()
        .map(|p| DropLine {
            date: p.date,
            y0: 0.0,
            y1: p.price,
        })
        .collect();

    let shaded_region = ceiling.and_then(|c| shaded_region(series, c, rules));

    let ceiling_line = ceiling.map(|c| {
        let spread = series.max_price() - series.min_price();
        CeilingLine {
            y: c.value(),
            text: format!("Max Legal: {}", fmt_dollars(c.value())),
            text_y: c.value() + spread * rules.ceiling_label_lift,
        }
    });

    ChartGeometry {
        line,
        drop_lines,
        shaded_region,
        ceiling_line,
        emergency_line: EmergencyLine {
            date: rules.emergency_date,
            y0: 0.0,
            y1: 1.0,
            text: "Emergency Date".to_string(),
        },
    }
}

/// The band above the ceiling from the first post-emergency observation onward.
///
/// This is a visual approximation of "prices above the legal maximum during the
/// restricted window": the band spans ceiling..`max * shade_top_factor` and does
/// not intersect the price line.
fn shaded_region(series: &Series, ceiling: Ceiling, rules: &ChartRules) -> Option<ShadedRegion> {
    let points = series.points();
    let start_idx = points.iter().position(|p| p.date > rules.emergency_date)?;
    let shaded: Vec<NaiveDate> = points[start_idx..].iter().map(|p| p.date).collect();

    let bottom = ceiling.value();
    let top = series.max_price() * rules.shade_top_factor;

    let mut polygon = Vec::with_capacity(shaded.len() * 2);
    polygon.extend(shaded.iter().map(|&d| (d, bottom)));
    polygon.extend(shaded.iter().rev().map(|&d| (d, top)));

    Some(ShadedRegion {
        start: shaded[0],
        end: *shaded.last()?,
        bottom,
        top,
        polygon,
    })
}
