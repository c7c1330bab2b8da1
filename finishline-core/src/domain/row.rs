use std::fmt;

use serde::{Deserialize, Serialize};

/// Race distance. Miles are fixed constants, never inferred from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    Half,
    Full,
}

impl EventType {
    pub const ALL: [EventType; 2] = [EventType::Full, EventType::Half];

    pub fn distance_miles(self) -> f64 {
        match self {
            EventType::Full => 26.2,
            EventType::Half => 13.1,
        }
    }

    /// Label used by the results source ("Marathon" / "Half Marathon").
    pub fn label(self) -> &'static str {
        match self {
            EventType::Full => "Marathon",
            EventType::Half => "Half Marathon",
        }
    }

    /// Classify a free-text `event_type` value.
    pub fn parse_label(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        if lower.contains("half") {
            Some(EventType::Half)
        } else if lower.contains("full") || lower.contains("marathon") {
            Some(EventType::Full)
        } else {
            None
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
    Unknown,
}

impl Gender {
    /// First `M`/`F` letter anywhere in the value ("12 M", "Female", "f").
    pub fn extract(value: &str) -> Gender {
        value
            .chars()
            .find_map(|c| match c.to_ascii_uppercase() {
                'M' => Some(Gender::M),
                'F' => Some(Gender::F),
                _ => None,
            })
            .unwrap_or(Gender::Unknown)
    }

    /// Plain `Gender` column: only an exact single letter counts.
    pub fn from_column(value: &str) -> Gender {
        match value.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Gender::M,
            "F" | "FEMALE" => Gender::F,
            _ => Gender::Unknown,
        }
    }

    pub fn initial(self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
            Gender::Unknown => "",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Unknown => f.write_str("Unknown"),
            g => f.write_str(g.initial()),
        }
    }
}

/// One finisher record. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub event_name: String,
    pub event_type: EventType,
    /// `None` when the chip time was present but malformed.
    pub chip_time_seconds: Option<u32>,
    pub gender: Gender,
    /// Raw `Place Gender` text (e.g. "12 M"), if the source carried one.
    pub place_gender_raw: Option<String>,
    pub age: Option<u32>,
    /// Bracket label such as "30-34".
    pub age_range_label: Option<String>,
    /// Free text; a leading rank token is stripped when counting divisions.
    pub place_division_raw: Option<String>,
    pub pace_seconds_per_mile: Option<f64>,
}

impl ResultRow {
    /// Gender used for gender placement: the `Place Gender` letter when one
    /// is found there, else the plain gender column.
    pub fn ranking_gender(&self) -> Gender {
        match self.place_gender_raw.as_deref().map(Gender::extract) {
            Some(g @ (Gender::M | Gender::F)) => g,
            // A Place Gender with no M/F letter ("17") still falls back.
            _ => self.gender,
        }
    }

    /// Pace from the dedicated column, else chip time over distance.
    pub fn pace_or_derived(&self) -> Option<f64> {
        self.pace_seconds_per_mile.filter(|p| *p > 0.0).or_else(|| {
            self.chip_time_seconds
                .map(|t| t as f64 / self.event_type.distance_miles())
        })
    }

    /// Division label with any leading rank number and NBSPs removed
    /// ("3 M30-34" -> "M30-34"). `None` when nothing is left.
    pub fn division_label(&self) -> Option<String> {
        let raw = self.place_division_raw.as_deref()?;
        let without_rank = raw
            .trim_start()
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .trim_start();
        let cleaned: String = without_rank.chars().filter(|c| *c != '\u{00A0}').collect();
        let cleaned = cleaned.trim();
        (!cleaned.is_empty()).then(|| cleaned.to_string())
    }
}

/// The finalized, immutable results table handed over by ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter()
    }
}

impl From<Vec<ResultRow>> for ResultTable {
    fn from(rows: Vec<ResultRow>) -> Self {
        Self::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ResultRow {
        ResultRow {
            event_name: "City Marathon".into(),
            event_type: EventType::Full,
            chip_time_seconds: Some(13_100),
            gender: Gender::F,
            place_gender_raw: None,
            age: Some(31),
            age_range_label: Some("30-34".into()),
            place_division_raw: None,
            pace_seconds_per_mile: None,
        }
    }

    #[test]
    fn event_type_labels() {
        assert_eq!(EventType::parse_label("Half Marathon"), Some(EventType::Half));
        assert_eq!(EventType::parse_label("Marathon"), Some(EventType::Full));
        assert_eq!(EventType::parse_label("full"), Some(EventType::Full));
        assert_eq!(EventType::parse_label("10K"), None);
        assert_eq!(EventType::Full.distance_miles(), 26.2);
        assert_eq!(EventType::Half.distance_miles(), 13.1);
    }

    #[test]
    fn gender_extraction() {
        assert_eq!(Gender::extract("12 M"), Gender::M);
        assert_eq!(Gender::extract("f"), Gender::F);
        assert_eq!(Gender::extract("17"), Gender::Unknown);
        assert_eq!(Gender::from_column(" m "), Gender::M);
        assert_eq!(Gender::from_column("X"), Gender::Unknown);
    }

    #[test]
    fn ranking_gender_falls_back_to_column() {
        let mut r = row();
        assert_eq!(r.ranking_gender(), Gender::F);
        r.place_gender_raw = Some("4 M".into());
        assert_eq!(r.ranking_gender(), Gender::M);
        r.place_gender_raw = Some("4".into());
        assert_eq!(r.ranking_gender(), Gender::F);
    }

    #[test]
    fn pace_prefers_column() {
        let mut r = row();
        assert!((r.pace_or_derived().unwrap() - 500.0).abs() < 1e-9);
        r.pace_seconds_per_mile = Some(480.0);
        assert_eq!(r.pace_or_derived(), Some(480.0));
        r.pace_seconds_per_mile = None;
        r.chip_time_seconds = None;
        assert_eq!(r.pace_or_derived(), None);
    }

    #[test]
    fn division_label_strips_rank_and_nbsp() {
        let mut r = row();
        r.place_division_raw = Some("3 F30-34".into());
        assert_eq!(r.division_label().as_deref(), Some("F30-34"));
        r.place_division_raw = Some("12\u{00A0}M\u{00A0}40-44".into());
        assert_eq!(r.division_label().as_deref(), Some("M40-44"));
        r.place_division_raw = Some("  7 ".into());
        assert_eq!(r.division_label(), None);
    }
}
