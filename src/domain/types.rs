//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by the chart pipeline in-memory
//! - exported to JSON for an external rendering surface
//! - drawn by the terminal renderers (ASCII and Plotters)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date the price-gouging declaration took effect (California, 2025).
pub const EMERGENCY_DATE: (i32, u32, u32) = (2025, 1, 7);

/// FMR rule: the maximum legal rent is this multiple of fair-market rent.
pub const FMR_MULTIPLIER: f64 = 1.6;

/// Ten-percent rule: the maximum legal rent is this multiple of the base price.
pub const TEN_PERCENT_MULTIPLIER: f64 = 1.1;

/// Status shown for a listing whose rule is neither `tenpercent` nor `fmr`.
pub const UNKNOWN_RULE_MESSAGE: &str = "Unknown gouging rule; unable to calculate ceiling.";

/// Which regulatory formula applies to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GougingRule {
    /// Cap relative to the pre-emergency base price.
    Tenpercent,
    /// Cap relative to the fair-market-rent benchmark.
    Fmr,
    /// Anything else the listing store may carry.
    #[serde(other)]
    Unknown,
}

impl GougingRule {
    /// Parse the raw rule string stored with a listing.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("tenpercent") => GougingRule::Tenpercent,
            Some("fmr") => GougingRule::Fmr,
            _ => GougingRule::Unknown,
        }
    }

    /// Short label shown next to "Rule".
    pub fn display_name(self) -> &'static str {
        match self {
            GougingRule::Tenpercent => "10%",
            GougingRule::Fmr => "FMR",
            GougingRule::Unknown => "Unknown",
        }
    }

    /// Observation labels charted for this rule, in regulatory event order.
    ///
    /// Returns `None` when no ceiling can be reasoned about.
    pub fn series_labels(self) -> Option<&'static [ObservationLabel]> {
        match self {
            GougingRule::Tenpercent => Some(&[
                ObservationLabel::Base,
                ObservationLabel::FirstGouge,
                ObservationLabel::Peak,
                ObservationLabel::Current,
            ]),
            GougingRule::Fmr => Some(&[
                ObservationLabel::FirstGouge,
                ObservationLabel::Peak,
                ObservationLabel::Current,
            ]),
            GougingRule::Unknown => None,
        }
    }
}

/// Regulatory significance of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationLabel {
    Base,
    FirstGouge,
    Peak,
    Current,
}

impl ObservationLabel {
    pub fn display_name(self) -> &'static str {
        match self {
            ObservationLabel::Base => "Base",
            ObservationLabel::FirstGouge => "First Gouge",
            ObservationLabel::Peak => "Peak",
            ObservationLabel::Current => "Current",
        }
    }
}

/// A raw (date, price) pair as supplied by the listing store; either half may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawObservation {
    pub date: Option<NaiveDate>,
    pub price: Option<f64>,
}

/// The four raw observation slots of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawHistory {
    pub base: RawObservation,
    pub first_gouged: RawObservation,
    pub emergency_peak: RawObservation,
    pub latest: RawObservation,
}

impl RawHistory {
    pub fn get(&self, label: ObservationLabel) -> RawObservation {
        match label {
            ObservationLabel::Base => self.base,
            ObservationLabel::FirstGouge => self.first_gouged,
            ObservationLabel::Peak => self.emergency_peak,
            ObservationLabel::Current => self.latest,
        }
    }
}

/// One validated (date, price) sample tagged with its label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub price: f64,
    pub label: ObservationLabel,
}

/// Ordered, non-empty observation sequence (caller order is authoritative).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    points: Vec<Observation>,
}

impl Series {
    /// Only constructed by the normalizer, which guarantees `points` is non-empty.
    pub(crate) fn from_points(points: Vec<Observation>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn min_price(&self) -> f64 {
        self.points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min)
    }

    pub fn max_price(&self) -> f64 {
        self.points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Validated legal maximum price (finite, strictly positive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ceiling(pub(crate) f64);

impl Ceiling {
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Jurisdictional constants and layout knobs passed into the chart builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRules {
    pub emergency_date: NaiveDate,
    pub fmr_multiplier: f64,
    pub ten_percent_multiplier: f64,

    /// Shaded band top edge = `max(prices) * shade_top_factor`.
    pub shade_top_factor: f64,
    /// Ceiling annotation sits this fraction of the price span above the ceiling.
    pub ceiling_label_lift: f64,

    pub axis_price_low: f64,
    pub axis_ceiling_low: f64,
    pub axis_price_high: f64,
    pub axis_ceiling_high: f64,
    pub axis_pad: f64,
    /// Smallest outward pad, so a flat all-zero series still gets a visible range.
    pub axis_min_pad: f64,

    /// Pixel offsets for price labels (positive = up).
    pub label_lead_offset: i32,
    pub label_offset: i32,
    pub label_tail_offset: i32,
}

impl Default for ChartRules {
    fn default() -> Self {
        let (y, m, d) = EMERGENCY_DATE;
        Self {
            emergency_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
            fmr_multiplier: FMR_MULTIPLIER,
            ten_percent_multiplier: TEN_PERCENT_MULTIPLIER,
            shade_top_factor: 1.2,
            ceiling_label_lift: 0.05,
            axis_price_low: 0.7,
            axis_ceiling_low: 0.8,
            axis_price_high: 1.3,
            axis_ceiling_high: 1.2,
            axis_pad: 0.1,
            axis_min_pad: 1.0,
            label_lead_offset: 30,
            label_offset: 20,
            label_tail_offset: -30,
        }
    }
}

/// A vertical dotted segment from `y = 0` up to the observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropLine {
    pub date: NaiveDate,
    pub y0: f64,
    pub y1: f64,
}

/// Violation band: from the first post-emergency observation to the last one,
/// between the ceiling and the band top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadedRegion {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub bottom: f64,
    pub top: f64,
    /// Closed polygon: bottom edge forward over the shaded dates, top edge back.
    pub polygon: Vec<(NaiveDate, f64)>,
}

/// Horizontal reference at the legal maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeilingLine {
    pub y: f64,
    pub text: String,
    pub text_y: f64,
}

/// Vertical reference at the emergency date.
///
/// `y0`/`y1` are axis fractions (0 = bottom, 1 = top), not data values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyLine {
    pub date: NaiveDate,
    pub y0: f64,
    pub y1: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLabel {
    pub date: NaiveDate,
    pub price: f64,
    pub label: ObservationLabel,
    pub text: String,
    /// Vertical pixel shift; positive moves the text up.
    pub y_offset: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub y_min: f64,
    pub y_max: f64,
}

impl AxisRange {
    pub fn contains_strictly(&self, y: f64) -> bool {
        y > self.y_min && y < self.y_max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XTick {
    pub date: NaiveDate,
    pub text: String,
}

/// Geometry derived from a series before layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub line: Vec<(NaiveDate, f64)>,
    pub drop_lines: Vec<DropLine>,
    pub shaded_region: Option<ShadedRegion>,
    pub ceiling_line: Option<CeilingLine>,
    pub emergency_line: EmergencyLine,
}

/// Fully resolved chart description handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub line: Vec<(NaiveDate, f64)>,
    pub drop_lines: Vec<DropLine>,
    pub shaded_region: Option<ShadedRegion>,
    pub ceiling_line: Option<CeilingLine>,
    pub emergency_line: EmergencyLine,
    pub labels: Vec<PriceLabel>,
    pub axis_range: AxisRange,
    pub x_ticks: Vec<XTick>,
}

impl ChartSpec {
    /// Earliest and latest date any element references (including the emergency line).
    pub fn date_span(&self) -> (NaiveDate, NaiveDate) {
        let e = self.emergency_line.date;
        self.line
            .iter()
            .map(|&(d, _)| d)
            .fold((e, e), |(lo, hi), d| (lo.min(d), hi.max(d)))
    }
}

/// A listing row as stored upstream; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingRecord {
    #[serde(deserialize_with = "text_or_number")]
    pub listing_id: String,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub agent_name: Option<String>,
    #[serde(deserialize_with = "opt_text_or_number")]
    pub agent_phone_number: Option<String>,
    pub listing_url: Option<String>,
    pub home_type: Option<String>,
    pub bedrooms: Option<f64>,
    #[serde(deserialize_with = "opt_text_or_number")]
    pub zipcode: Option<String>,
    pub gouging_rule: Option<String>,
    pub price_ceiling: Option<f64>,
    pub is_currently_unlisted: Option<bool>,

    pub base_price: Option<f64>,
    pub base_price_date: Option<String>,
    pub first_gouged_price: Option<f64>,
    pub first_gouged_price_date: Option<String>,
    pub emergency_peak_price: Option<f64>,
    pub emergency_peak_price_date: Option<String>,
    pub latest_price: Option<f64>,
    pub latest_price_date: Option<String>,

    pub fair_market_rent: Option<f64>,
}

/// Ids, ZIP codes and phone numbers arrive as strings or bare numbers depending on the store.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<TextOrNumber> for String {
    fn from(value: TextOrNumber) -> Self {
        match value {
            TextOrNumber::Text(s) => s,
            TextOrNumber::Int(n) => n.to_string(),
            TextOrNumber::Float(f) => f.to_string(),
        }
    }
}

fn text_or_number<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    TextOrNumber::deserialize(d).map(String::from)
}

fn opt_text_or_number<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<TextOrNumber>::deserialize(d)?
        .map(String::from)
        .filter(|s| !s.trim().is_empty()))
}

impl ListingRecord {
    pub fn rule(&self) -> GougingRule {
        GougingRule::from_raw(self.gouging_rule.as_deref())
    }
}

/// Everything a front-end needs to show one listing.
#[derive(Debug, Clone)]
pub struct ListingView {
    pub record: ListingRecord,
    pub rule: GougingRule,
    pub history: RawHistory,
    pub ceiling: Option<Ceiling>,
    /// `None` when the rule is unknown; the summary still renders.
    pub chart: Option<ChartSpec>,
}
