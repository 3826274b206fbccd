//! Reporting utilities: dollar formatting and the textual listing summary.
//!
//! We keep formatting code in one place so:
//! - the chart code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use chrono::NaiveDate;

use crate::domain::{ChartRules, GougingRule, ListingView, RawObservation, UNKNOWN_RULE_MESSAGE};

const NA: &str = "N/A";

/// `$1,234` style: thousands-separated, rounded to whole dollars.
pub fn fmt_dollars(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("$-{grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Format the listing header, home info and the rule-specific price metrics.
pub fn format_listing_summary(view: &ListingView, rules: &ChartRules) -> String {
    let r = &view.record;
    let h = &view.history;
    let mut out = String::new();

    let street = r.street_address.as_deref().unwrap_or(NA);
    let city = r.city.as_deref().unwrap_or(NA);
    out.push_str(&format!("=== {street}, {city} ===\n"));
    if let Some(url) = r.listing_url.as_deref().filter(|u| !u.is_empty() && *u != "#") {
        out.push_str(&format!("{url}\n"));
    }

    out.push_str(&format!(
        "Listing Agent: {} | Phone: {} | Type: {} | Bedrooms: {} | ZIP Code: {} | Currently Listed: {}\n",
        r.agent_name.as_deref().unwrap_or(NA),
        r.agent_phone_number.as_deref().unwrap_or(NA),
        r.home_type.as_deref().unwrap_or(NA),
        fmt_count(r.bedrooms),
        r.zipcode.as_deref().unwrap_or(NA),
        if r.is_currently_unlisted.unwrap_or(false) { "No" } else { "Yes" },
    ));

    out.push_str(&format!(
        "Current Rent: {} | Gouged Since: {} | Rule: {} | Rent Gouging?: {}\n",
        fmt_opt_dollars(h.latest.price),
        fmt_opt_date(h.first_gouged.date, "%m/%d"),
        view.rule.display_name(),
        if view.rule == GougingRule::Tenpercent { "Yes" } else { "Maybe" },
    ));
    out.push('\n');

    match view.rule {
        GougingRule::Tenpercent => {
            out.push_str(&format!(
                "Original Rent: {} | First Gouged Rent: {} | Current Rent: {} | Rent Increase: {}\n",
                fmt_opt_dollars(h.base.price),
                fmt_opt_dollars(h.first_gouged.price),
                fmt_opt_dollars(h.latest.price),
                pct_change(h.latest.price, h.base.price),
            ));
        }
        GougingRule::Fmr => {
            out.push_str(&format!(
                "Fair Market Rent (FMR): {} | Legal % of FMR: {:.0}% | Max Legal Rent: {}\n",
                fmt_opt_dollars(r.fair_market_rent),
                rules.fmr_multiplier * 100.0,
                fmt_opt_dollars(view.ceiling.map(|c| c.value())),
            ));
            out.push_str(&format!(
                "Current Rent: {} | Peak Rent: {} | Actual % of FMR: {}\n",
                fmt_opt_dollars(h.latest.price),
                fmt_opt_dollars(h.emergency_peak.price),
                pct_of(h.latest.price, r.fair_market_rent),
            ));
            out.push_str(&format!("- First Gouged Price: {}\n", fmt_event(h.first_gouged)));
            out.push_str(&format!("- Highest Gouged Price: {}\n", fmt_event(h.emergency_peak)));
            out.push_str(&format!("- Current Price: {}\n", fmt_event(h.latest)));
        }
        GougingRule::Unknown => {
            out.push_str(&format!("Status: {UNKNOWN_RULE_MESSAGE}\n"));
        }
    }

    out
}

fn fmt_opt_dollars(v: Option<f64>) -> String {
    v.map(fmt_dollars).unwrap_or_else(|| NA.to_string())
}

fn fmt_opt_date(d: Option<NaiveDate>, fmt: &str) -> String {
    d.map(|d| d.format(fmt).to_string()).unwrap_or_else(|| NA.to_string())
}

fn fmt_event(obs: RawObservation) -> String {
    format!(
        "{} on {}",
        fmt_opt_dollars(obs.price),
        fmt_opt_date(obs.date, "%B %d, %Y")
    )
}

fn fmt_count(v: Option<f64>) -> String {
    match v {
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v}"),
        None => NA.to_string(),
    }
}

fn pct_change(price: Option<f64>, base: Option<f64>) -> String {
    match (price, base) {
        (Some(p), Some(b)) if b > 0.0 => format!("{:.1}%", (p / b - 1.0) * 100.0),
        _ => NA.to_string(),
    }
}

fn pct_of(price: Option<f64>, benchmark: Option<f64>) -> String {
    match (price, benchmark) {
        (Some(p), Some(b)) if b > 0.0 => format!("{:.0}%", p / b * 100.0),
        _ => NA.to_string(),
    }
}
