use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::row::{EventType, Gender};

/// Rejected user input. Raised before any filtering happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("event name is empty")]
    EmptyEventName,

    #[error("age must be a whole number between 1 and 120, got '{0}'")]
    InvalidAge(String),

    #[error("pace must be a positive number of minutes per mile up to 60, got '{0}'")]
    InvalidPace(String),

    #[error("gender must be M or F")]
    UnsupportedGender,
}

/// The query context for one calculation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSelection {
    pub event_name: String,
    pub event_type: EventType,
    pub gender: Gender,
    pub age: u32,
    pub pace_minutes_per_mile: f64,
}

impl RaceSelection {
    /// Build a validated selection.
    pub fn new(
        event_name: impl Into<String>,
        event_type: EventType,
        gender: Gender,
        age: u32,
        pace_minutes_per_mile: f64,
    ) -> Result<Self, SelectionError> {
        let selection = Self {
            event_name: event_name.into(),
            event_type,
            gender,
            age,
            pace_minutes_per_mile,
        };
        selection.validate()?;
        Ok(selection)
    }

    /// Parse raw text fields (as typed into a form) into a selection.
    pub fn from_inputs(
        event_name: &str,
        event_type: EventType,
        gender: Gender,
        age: &str,
        pace_minutes_per_mile: &str,
    ) -> Result<Self, SelectionError> {
        let age_num: u32 = age
            .trim()
            .parse()
            .map_err(|_| SelectionError::InvalidAge(age.to_string()))?;
        let pace = crate::time::parse_pace_input(pace_minutes_per_mile)
            .ok_or_else(|| SelectionError::InvalidPace(pace_minutes_per_mile.to_string()))?;
        Self::new(event_name, event_type, gender, age_num, pace)
    }

    pub fn validate(&self) -> Result<(), SelectionError> {
        if self.event_name.trim().is_empty() {
            return Err(SelectionError::EmptyEventName);
        }
        if !(1..=120).contains(&self.age) {
            return Err(SelectionError::InvalidAge(self.age.to_string()));
        }
        let pace = self.pace_minutes_per_mile;
        if !pace.is_finite() || pace <= 0.0 || pace > 60.0 {
            return Err(SelectionError::InvalidPace(pace.to_string()));
        }
        if self.gender == Gender::Unknown {
            return Err(SelectionError::UnsupportedGender);
        }
        Ok(())
    }

    pub fn distance_miles(&self) -> f64 {
        self.event_type.distance_miles()
    }

    /// Candidate finish time: pace × distance, in seconds.
    pub fn finish_time_seconds(&self) -> f64 {
        self.pace_minutes_per_mile * self.distance_miles() * 60.0
    }

    pub fn age_range_label(&self) -> String {
        age_range_label(self.age)
    }

    /// Gender initial + bracket, e.g. "M30-34".
    pub fn division_label(&self) -> String {
        format!("{}{}", self.gender.initial(), self.age_range_label())
    }
}

/// Five-year bracket containing `age`: 27 -> "25-29", 30 -> "30-34".
pub fn age_range_label(age: u32) -> String {
    let lower = (age / 5) * 5;
    format!("{}-{}", lower, lower + 4)
}
