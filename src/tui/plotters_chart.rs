//! Plotters-powered price-history chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! All geometry comes precomputed in a `ChartSpec`; this widget only maps dates to
//! x values and draws.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::ChartSpec;
use crate::report::fmt_dollars;

/// `PriceLabel::y_offset` is in pixels for a plot of roughly this height.
const NOMINAL_PLOT_PX: f64 = 450.0;

pub struct GougePlottersChart<'a> {
    pub spec: &'a ChartSpec,
}

impl<'a> GougePlottersChart<'a> {
    /// X origin and span (days). A single-day span is widened so the axis is non-empty.
    fn x_frame(&self) -> (NaiveDate, f64) {
        let (lo, hi) = self.spec.date_span();
        let lo = lo - Duration::days(7);
        let days = ((hi - lo).num_days() + 7).max(1);
        (lo, days as f64)
    }
}

/// Key-point x axis. Delegates everything to Plotters' `WithKeyPoints`; it exists
/// only so `configure_mesh` type-checks (`WithKeyPoints<RangedCoordf64>` has no
/// `ValueFormatter`). Labels always come from `x_label_formatter`.
struct KeyPointAxis(plotters::coord::combinators::WithKeyPoints<plotters::coord::types::RangedCoordf64>);

impl Ranged for KeyPointAxis {
    type ValueType = f64;
    type FormatOption = plotters::coord::ranged1d::DefaultFormatting;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.0.map(value, limit)
    }

    fn key_points<Hint: plotters::coord::ranged1d::KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        self.0.key_points(hint)
    }

    fn range(&self) -> std::ops::Range<f64> {
        self.0.range()
    }

    fn axis_pixel_range(&self, limit: (i32, i32)) -> std::ops::Range<i32> {
        self.0.axis_pixel_range(limit)
    }
}

fn day_x(origin: NaiveDate, d: NaiveDate) -> f64 {
    (d - origin).num_days() as f64
}

/// Text of the resolved tick at `x`; ticks sit on whole days.
fn tick_text(spec: &ChartSpec, origin: NaiveDate, x: f64) -> String {
    spec.x_ticks
        .iter()
        .find(|t| day_x(origin, t.date) == x.round())
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

impl<'a> Widget for GougePlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let spec = self.spec;
        let (origin, x1) = self.x_frame();
        let (y0, y1) = (spec.axis_range.y_min, spec.axis_range.y_max);
        if !(y0.is_finite() && y1.is_finite()) || y1 <= y0 {
            return;
        }
        let tick_xs: Vec<f64> = spec.x_ticks.iter().map(|t| day_x(origin, t.date)).collect();

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(KeyPointAxis((0.0..x1).with_key_points(tick_xs.clone())), y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("Date")
                .y_desc("Price ($)")
                .y_labels(5)
                .x_label_formatter(&|v| tick_text(spec, origin, *v))
                .y_label_formatter(&|v| fmt_dollars(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let band_color = RGBColor(255, 0, 0).mix(0.2);
            let ceiling_color = RGBColor(255, 0, 0);
            let emergency_color = RGBColor(0, 128, 255);
            let drop_color = RGBColor(128, 128, 128);

            // 1) Violation band under everything else.
            if let Some(band) = &spec.shaded_region {
                let pts: Vec<(f64, f64)> = band.polygon.iter().map(|&(d, y)| (day_x(origin, d), y)).collect();
                chart.draw_series(std::iter::once(Polygon::new(pts, band_color.filled())))?;
            }

            // 2) Drop lines from the axis to each observation.
            for drop in &spec.drop_lines {
                let x = day_x(origin, drop.date);
                chart.draw_series(LineSeries::new([(x, drop.y0), (x, drop.y1)], &drop_color))?;
            }

            // 3) Ceiling reference + annotation.
            if let Some(ceiling) = &spec.ceiling_line {
                chart.draw_series(LineSeries::new([(0.0, ceiling.y), (x1, ceiling.y)], &ceiling_color))?;
                chart.draw_series(std::iter::once(Text::new(
                    ceiling.text.clone(),
                    (0.0, ceiling.text_y),
                    ("sans-serif", 10).into_font().color(&ceiling_color),
                )))?;
            }

            // 4) Emergency line spans the whole plot height (axis fractions -> data range).
            let em = &spec.emergency_line;
            let ex = day_x(origin, em.date);
            let ey0 = y0 + em.y0 * (y1 - y0);
            let ey1 = y0 + em.y1 * (y1 - y0);
            chart.draw_series(LineSeries::new([(ex, ey0), (ex, ey1)], &emergency_color))?;
            chart.draw_series(std::iter::once(Text::new(
                em.text.clone(),
                (ex, ey1),
                ("sans-serif", 10).into_font().color(&WHITE),
            )))?;

            // 5) Price line + markers.
            let line: Vec<(f64, f64)> = spec.line.iter().map(|&(d, y)| (day_x(origin, d), y)).collect();
            chart.draw_series(LineSeries::new(line.iter().copied(), &WHITE))?;
            chart.draw_series(line.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            // 6) Price labels, shifted by their pixel offset scaled to data units.
            let per_px = (y1 - y0) / NOMINAL_PLOT_PX;
            chart.draw_series(spec.labels.iter().map(|l| {
                Text::new(
                    l.text.clone(),
                    (day_x(origin, l.date), l.price + f64::from(l.y_offset) * per_px),
                    ("sans-serif", 10).into_font().color(&WHITE),
                )
            }))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
