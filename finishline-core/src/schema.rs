//! Results CSV contract: the boundary between ingestion and the statistics engine.
//!
//! Defines the column names the ingestion layer reads. Three columns are
//! required to place a finisher at all; the rest feed the gender, division
//! and pace breakdowns and degrade to "Unknown" when absent.

use serde::Serialize;

pub const COL_EVENT_NAME: &str = "event_name";
pub const COL_EVENT_TYPE: &str = "event_type";
pub const COL_CHIP_TIME: &str = "Chip Time";
pub const COL_GENDER: &str = "Gender";
pub const COL_PLACE_GENDER: &str = "Place Gender";
pub const COL_AGE: &str = "Age";
pub const COL_PLACE_DIV: &str = "Place Div";
pub const COL_PACE: &str = "Pace (min/miles)";

/// A single column in the results CSV contract.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SchemaField {
    pub name: &'static str,
    pub required: bool,
}

/// The results CSV contract.
///
/// - Header row required; column order is free
/// - `Chip Time` and `Pace (min/miles)` are clock strings (`H:MM:SS`, `M:SS`)
/// - `Age` is either a bracket label ("30-34") or a plain number
/// - Unknown columns are ignored
pub const RESULTS_SCHEMA: &[SchemaField] = &[
    SchemaField {
        name: COL_EVENT_NAME,
        required: true,
    },
    SchemaField {
        name: COL_EVENT_TYPE,
        required: true,
    },
    SchemaField {
        name: COL_CHIP_TIME,
        required: true,
    },
    SchemaField {
        name: COL_GENDER,
        required: false,
    },
    SchemaField {
        name: COL_PLACE_GENDER,
        required: false,
    },
    SchemaField {
        name: COL_AGE,
        required: false,
    },
    SchemaField {
        name: COL_PLACE_DIV,
        required: false,
    },
    SchemaField {
        name: COL_PACE,
        required: false,
    },
];

/// Result of header validation.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidation {
    pub is_valid: bool,
    /// Missing required columns.
    pub errors: Vec<String>,
    /// Missing optional columns; the matching breakdowns will be empty.
    pub warnings: Vec<String>,
}

/// Check a header row against the contract. Header names are trimmed
/// before comparison (exports often pad them).
pub fn validate_headers<S: AsRef<str>>(headers: &[S]) -> SchemaValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for expected in RESULTS_SCHEMA {
        let present = headers.iter().any(|h| h.as_ref().trim() == expected.name);
        match (present, expected.required) {
            (true, _) => {}
            (false, true) => errors.push(format!("missing required column '{}'", expected.name)),
            (false, false) => warnings.push(format!("missing optional column '{}'", expected.name)),
        }
    }

    SchemaValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_header_passes() {
        let headers: Vec<&str> = RESULTS_SCHEMA.iter().map(|f| f.name).collect();
        let result = validate_headers(&headers);
        assert!(result.is_valid, "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn missing_required_column_fails() {
        let result = validate_headers(&["event_name", "event_type", "Gender"]);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("Chip Time")));
    }

    #[test]
    fn missing_optional_column_warns() {
        let result = validate_headers(&[" event_name ", "event_type", "Chip Time", "Bib"]);
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("Place Div")));
        assert_eq!(result.warnings.len(), 5);
    }

    #[test]
    fn three_required_fields() {
        assert_eq!(RESULTS_SCHEMA.iter().filter(|f| f.required).count(), 3);
    }
}
