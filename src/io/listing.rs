//! Listing store: load gouged-listing records from JSON or CSV and look them up by id.
//!
//! Both formats use the same column/field names as `domain::ListingRecord`.
//! Every field is optional; missing values are resolved later by the pipeline.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::domain::{ChartRules, GougingRule, ListingRecord, RawHistory, RawObservation};
use crate::error::AppError;

/// In-memory listing table.
#[derive(Debug, Clone, Default)]
pub struct ListingStore {
    records: Vec<ListingRecord>,
}

impl ListingStore {
    pub fn new(records: Vec<ListingRecord>) -> Self {
        Self { records }
    }

    /// Load a store from `.json` (array of records) or `.csv` (header row + records).
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)
            .map_err(|e| AppError::new(2, format!("Failed to open listings '{}': {e}", path.display())))?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let store = match ext.as_deref() {
            Some("json") => Self::from_json_reader(file)?,
            Some("csv") => Self::from_csv_reader(file)?,
            _ => {
                return Err(AppError::new(
                    2,
                    format!("Unsupported listings file '{}'. Expected .json or .csv.", path.display()),
                ));
            }
        };

        info!(path = %path.display(), listings = store.records.len(), "loaded listing store");
        Ok(store)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let records: Vec<ListingRecord> = serde_json::from_reader(reader)
            .map_err(|e| AppError::new(2, format!("Invalid listings JSON: {e}")))?;
        Ok(Self::new(records))
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for (idx, row) in rdr.deserialize::<ListingRecord>().enumerate() {
            // +2: 1-based, plus the header line.
            let record = row.map_err(|e| AppError::new(2, format!("Invalid listings CSV row {}: {e}", idx + 2)))?;
            records.push(record);
        }
        Ok(Self::new(records))
    }

    pub fn find(&self, listing_id: &str) -> Option<&ListingRecord> {
        let id = listing_id.trim();
        let found = self.records.iter().find(|r| r.listing_id == id);
        debug!(listing_id = id, found = found.is_some(), "listing lookup");
        found
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.listing_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse the four (date, price) slots of a record.
///
/// An unparseable date is a data error; a missing one simply leaves the slot empty.
pub fn raw_history(record: &ListingRecord) -> Result<RawHistory, AppError> {
    let slot = |field: &str, date: &Option<String>, price: Option<f64>| -> Result<RawObservation, AppError> {
        let date = match date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(parse_listing_date(s).map_err(|e| AppError::new(4, format!("{field}: {e}")))?),
            None => None,
        };
        Ok(RawObservation { date, price })
    };

    Ok(RawHistory {
        base: slot("base_price_date", &record.base_price_date, record.base_price)?,
        first_gouged: slot(
            "first_gouged_price_date",
            &record.first_gouged_price_date,
            record.first_gouged_price,
        )?,
        emergency_peak: slot(
            "emergency_peak_price_date",
            &record.emergency_peak_price_date,
            record.emergency_peak_price,
        )?,
        latest: slot("latest_price_date", &record.latest_price_date, record.latest_price)?,
    })
}

/// Stored ceiling if present, otherwise the rule's formula when its input is known.
pub fn resolve_ceiling(record: &ListingRecord, rule: GougingRule, rules: &ChartRules) -> Option<f64> {
    if record.price_ceiling.is_some() {
        return record.price_ceiling;
    }
    match rule {
        GougingRule::Fmr => record.fair_market_rent.map(|fmr| fmr * rules.fmr_multiplier),
        GougingRule::Tenpercent => record.base_price.map(|base| base * rules.ten_percent_multiplier),
        GougingRule::Unknown => None,
    }
}

/// Accepts plain dates, RFC 3339 timestamps (as stored by Postgres), and naive datetimes.
pub fn parse_listing_date(s: &str) -> Result<NaiveDate, String> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    const FMTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    for fmt in FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected YYYY-MM-DD or an ISO 8601 timestamp."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"[
        {
            "listing_id": 101,
            "street_address": "12 Ocean Ave",
            "zipcode": 90401,
            "gouging_rule": "fmr",
            "fair_market_rent": 2000,
            "first_gouged_price": 3400,
            "first_gouged_price_date": "2025-01-20T00:00:00+00:00",
            "latest_price": 3300,
            "latest_price_date": "2025-03-02",
            "extra_column": "ignored"
        },
        { "listing_id": "abc", "gouging_rule": "tenpercent", "price_ceiling": 1100 }
    ]"#;

    #[test]
    fn json_store_accepts_numeric_ids_and_zipcodes() {
        let store = ListingStore::from_json_reader(JSON.as_bytes()).unwrap();
        assert_eq!(store.len(), 2);
        let rec = store.find(" 101 ").unwrap();
        assert_eq!(rec.zipcode.as_deref(), Some("90401"));
        assert_eq!(rec.rule(), GougingRule::Fmr);
        assert!(store.find("missing").is_none());
        assert_eq!(store.ids().collect::<Vec<_>>(), vec!["101", "abc"]);
    }

    #[test]
    fn csv_store_treats_empty_cells_as_missing() {
        let csv = "listing_id,gouging_rule,price_ceiling,base_price,base_price_date,latest_price,latest_price_date\n\
                   L1,tenpercent,,1000,2023-01-01,1400,2025-04-01\n";
        let store = ListingStore::from_csv_reader(csv.as_bytes()).unwrap();
        let rec = store.find("L1").unwrap();
        assert_eq!(rec.price_ceiling, None);
        assert_eq!(rec.base_price, Some(1000.0));

        let history = raw_history(rec).unwrap();
        assert_eq!(history.base.date, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(history.first_gouged, RawObservation::default());
    }

    #[test]
    fn timestamps_reduce_to_dates() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        assert_eq!(parse_listing_date("2025-01-20").unwrap(), d);
        assert_eq!(parse_listing_date("2025-01-20T08:30:00+00:00").unwrap(), d);
        assert_eq!(parse_listing_date("2025-01-20 08:30:00").unwrap(), d);
        assert!(parse_listing_date("01/20/2025").is_err());
    }

    #[test]
    fn bad_dates_name_the_field() {
        let rec = ListingRecord {
            latest_price: Some(1.0),
            latest_price_date: Some("soon".to_string()),
            ..ListingRecord::default()
        };
        let err = raw_history(&rec).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().starts_with("latest_price_date:"));
    }

    #[test]
    fn ceiling_falls_back_to_rule_formula() {
        let rules = ChartRules::default();
        let mut rec = ListingRecord {
            fair_market_rent: Some(2000.0),
            base_price: Some(1000.0),
            ..ListingRecord::default()
        };
        let fmr = resolve_ceiling(&rec, GougingRule::Fmr, &rules).unwrap();
        assert!((fmr - 3200.0).abs() < 1e-9);
        let ten = resolve_ceiling(&rec, GougingRule::Tenpercent, &rules).unwrap();
        assert!((ten - 1100.0).abs() < 1e-9);
        assert_eq!(resolve_ceiling(&rec, GougingRule::Unknown, &rules), None);

        rec.price_ceiling = Some(2500.0);
        assert_eq!(resolve_ceiling(&rec, GougingRule::Fmr, &rules), Some(2500.0));
    }
}
