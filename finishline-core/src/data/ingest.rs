//! Results CSV ingestion.
//!
//! Turns a headered results CSV into an immutable [`ResultTable`]. Bad rows
//! are dropped and counted, never fatal; only a missing required column or
//! an empty result aborts the load.

use std::io::Read;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::provider::{DataError, DataSource};
use crate::domain::{EventType, Gender, ResultRow, ResultTable};
use crate::schema::{self, validate_headers};
use crate::time::parse_clock;

/// One CSV record as it appears on disk. Every column is optional.
#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(rename = "event_name", default)]
    event_name: Option<String>,
    #[serde(rename = "event_type", default)]
    event_type: Option<String>,
    #[serde(rename = "Chip Time", default)]
    chip_time: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    #[serde(rename = "Place Gender", default)]
    place_gender: Option<String>,
    #[serde(rename = "Age", default)]
    age: Option<String>,
    #[serde(rename = "Place Div", default)]
    place_div: Option<String>,
    #[serde(rename = "Pace (min/miles)", default)]
    pace: Option<String>,
}

/// What a load produced and what it threw away.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub rows: ResultTable,
    /// Records read from the file, including dropped ones.
    pub raw_count: usize,
    /// No event name or no chip time.
    pub dropped_missing: usize,
    /// Event type naming neither distance.
    pub dropped_event_type: usize,
    /// Records the CSV reader could not decode.
    pub dropped_malformed: usize,
    /// Kept rows whose chip time did not parse; excluded from time statistics.
    pub unparsed_times: usize,
}

impl IngestReport {
    pub fn dropped(&self) -> usize {
        self.dropped_missing + self.dropped_event_type + self.dropped_malformed
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `"30-34"` -> `(Some(30), Some("30-34"))`; `"41"` -> `(Some(41), None)`.
pub fn split_age(value: &str) -> (Option<u32>, Option<String>) {
    let value = value.trim();
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    let age = digits.parse().ok();
    let label = value.contains('-').then(|| value.to_string());
    (age, label)
}

fn into_row(raw: RawRecord, event_name: String, event_type: EventType, chip: &str) -> ResultRow {
    let (age, age_range_label) = raw.age.as_deref().map(split_age).unwrap_or((None, None));
    ResultRow {
        event_name,
        event_type,
        chip_time_seconds: parse_clock(chip).ok(),
        gender: raw
            .gender
            .as_deref()
            .map(Gender::from_column)
            .unwrap_or(Gender::Unknown),
        place_gender_raw: non_empty(raw.place_gender),
        age,
        age_range_label,
        place_division_raw: raw.place_div.filter(|v| !v.trim().is_empty()),
        pace_seconds_per_mile: raw
            .pace
            .as_deref()
            .and_then(|p| parse_clock(p).ok())
            .map(f64::from),
    }
}

/// Parse results CSV from any reader. `origin` names the source in logs and errors.
pub fn ingest_reader<R: Read>(reader: R, origin: &str) -> Result<IngestReport, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let validation = validate_headers(&headers);
    if !validation.is_valid {
        let missing = schema::RESULTS_SCHEMA
            .iter()
            .filter(|f| f.required && !headers.iter().any(|h| h == f.name))
            .map(|f| f.name.to_string())
            .collect();
        return Err(DataError::MissingColumn(missing));
    }
    for warning in &validation.warnings {
        warn!(source = origin, "{warning}");
    }

    let mut report = IngestReport::default();
    let mut rows = Vec::new();

    for record in rdr.deserialize::<RawRecord>() {
        report.raw_count += 1;
        let mut raw = match record {
            Ok(raw) => raw,
            Err(e) => {
                debug!(error = %e, "skipping undecodable record");
                report.dropped_malformed += 1;
                continue;
            }
        };

        let (Some(event_name), Some(chip)) = (non_empty(raw.event_name.take()), non_empty(raw.chip_time.take()))
        else {
            report.dropped_missing += 1;
            continue;
        };
        let Some(event_type) = raw.event_type.as_deref().and_then(EventType::parse_label) else {
            report.dropped_event_type += 1;
            continue;
        };

        let row = into_row(raw, event_name, event_type, &chip);
        if row.chip_time_seconds.is_none() {
            report.unparsed_times += 1;
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(DataError::Empty(origin.to_string()));
    }

    report.rows = ResultTable::new(rows);
    info!(
        source = origin,
        raw = report.raw_count,
        kept = report.rows.len(),
        dropped_missing = report.dropped_missing,
        dropped_event_type = report.dropped_event_type,
        dropped_malformed = report.dropped_malformed,
        unparsed_times = report.unparsed_times,
        "results loaded"
    );
    Ok(report)
}

pub fn ingest_str(text: &str, origin: &str) -> Result<IngestReport, DataError> {
    ingest_reader(text.as_bytes(), origin)
}

/// Fetch `source` and parse it.
pub fn load(source: &DataSource) -> Result<IngestReport, DataError> {
    let provider = source.provider()?;
    debug!(source = provider.name(), "fetching results");
    let bytes = provider.fetch()?;
    ingest_reader(bytes.as_slice(), provider.name())
}
