//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements, in draw order (later wins):
//! - violation band: `.`
//! - ceiling line: `=`
//! - emergency line: `|` (`+` where it crosses the ceiling)
//! - drop lines: `:`
//! - price line: `-`
//! - observations: `o`
//! - price labels, one row above or below their point

use chrono::NaiveDate;

use crate::domain::ChartSpec;
use crate::report::fmt_dollars;

/// Render a chart spec into a fixed-size character grid with a header and tick row.
pub fn render_ascii_chart(spec: &ChartSpec, width: usize, height: usize) -> String {
    let width = width.max(20);
    let height = height.max(8);

    let (d_min, d_max) = spec.date_span();
    let xs = XScale::new(d_min, d_max, width);
    let (y_min, y_max) = (spec.axis_range.y_min, spec.axis_range.y_max);

    let mut grid = vec![vec![' '; width]; height];

    if let Some(band) = &spec.shaded_region {
        let (x0, x1) = (xs.map(band.start), xs.map(band.end));
        let (r0, r1) = (map_y(band.top, y_min, y_max, height), map_y(band.bottom, y_min, y_max, height));
        for row in grid.iter_mut().take(r0.max(r1) + 1).skip(r0.min(r1)) {
            for cell in row.iter_mut().take(x0.max(x1) + 1).skip(x0.min(x1)) {
                *cell = '.';
            }
        }
    }

    if let Some(ceiling) = &spec.ceiling_line {
        let r = map_y(ceiling.y, y_min, y_max, height);
        grid[r].iter_mut().for_each(|c| *c = '=');
    }

    let ex = xs.map(spec.emergency_line.date);
    for row in grid.iter_mut() {
        row[ex] = if row[ex] == '=' { '+' } else { '|' };
    }

    for drop in &spec.drop_lines {
        let x = xs.map(drop.date);
        let r_top = map_y(drop.y1, y_min, y_max, height);
        let r_bottom = map_y(drop.y0, y_min, y_max, height);
        for row in grid.iter_mut().take(r_bottom + 1).skip(r_top) {
            if matches!(row[x], ' ' | '.') {
                row[x] = ':';
            }
        }
    }

    let cells: Vec<(usize, usize)> = spec
        .line
        .iter()
        .map(|&(d, y)| (xs.map(d), map_y(y, y_min, y_max, height)))
        .collect();
    for pair in cells.windows(2) {
        draw_line(&mut grid, pair[0], pair[1], '-');
    }
    for &(x, r) in &cells {
        grid[r][x] = 'o';
    }

    for label in &spec.labels {
        let x = xs.map(label.date);
        let r = map_y(label.price, y_min, y_max, height);
        let r = if label.y_offset > 0 {
            r.saturating_sub(1)
        } else {
            (r + 1).min(height - 1)
        };
        put_text(&mut grid[r], x, &label.text);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Chart: {} .. {} | y=[{}, {}]",
        d_min.format("%m/%d/%y"),
        d_max.format("%m/%d/%y"),
        fmt_dollars(y_min),
        fmt_dollars(y_max),
    ));
    if let Some(ceiling) = &spec.ceiling_line {
        out.push_str(&format!(" | {}", ceiling.text));
    }
    out.push_str(&format!(
        " | {}: {}\n",
        spec.emergency_line.text,
        spec.emergency_line.date.format("%m/%d/%y")
    ));

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    let ticks: Vec<&str> = spec.x_ticks.iter().map(|t| t.text.as_str()).collect();
    out.push_str(&format!("Ticks: {}\n", ticks.join(" ")));

    out
}

/// Day-resolution x mapping; a single-day span is widened by a day each side.
struct XScale {
    origin: NaiveDate,
    days: f64,
    width: usize,
}

impl XScale {
    fn new(min: NaiveDate, max: NaiveDate, width: usize) -> Self {
        let span = (max - min).num_days();
        if span <= 0 {
            Self {
                origin: min - chrono::Duration::days(1),
                days: 2.0,
                width,
            }
        } else {
            Self {
                origin: min,
                days: span as f64,
                width,
            }
        }
    }

    fn map(&self, d: NaiveDate) -> usize {
        let u = ((d - self.origin).num_days() as f64 / self.days).clamp(0.0, 1.0);
        (u * (self.width as f64 - 1.0)).round() as usize
    }
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Center `text` on column `x`, clipped to the row. Markers stay visible.
fn put_text(row: &mut [char], x: usize, text: &str) {
    let len = text.chars().count();
    let start = x.saturating_sub(len / 2).min(row.len().saturating_sub(len));
    for (cell, ch) in row.iter_mut().skip(start).zip(text.chars()) {
        if *cell != 'o' {
            *cell = ch;
        }
    }
}

/// Integer line drawing (Bresenham-ish). Never overwrites markers.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] != 'o'
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
