//! Race list and per-race distance availability.

use serde::Serialize;
use tracing::debug;

use crate::domain::{EventType, ResultTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceEntry {
    pub name: String,
    pub has_full: bool,
    pub has_half: bool,
}

impl RaceEntry {
    pub fn has(&self, distance: EventType) -> bool {
        match distance {
            EventType::Full => self.has_full,
            EventType::Half => self.has_half,
        }
    }

    pub fn distances(&self) -> Vec<EventType> {
        EventType::ALL.into_iter().filter(|d| self.has(*d)).collect()
    }
}

/// Unique race names in first-seen order, keyed the way [`crate::Field::select`]
/// filters rows: on the exact trimmed name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventCatalog {
    races: Vec<RaceEntry>,
}

impl EventCatalog {
    /// Spellings that differ only in case stay separate races.
    pub fn from_rows(table: &ResultTable) -> Self {
        let mut races: Vec<RaceEntry> = Vec::new();
        for row in table.iter() {
            let name = row.event_name.trim();
            if name.is_empty() {
                continue;
            }
            let idx = match races.iter().position(|r| r.name == name) {
                Some(idx) => idx,
                None => {
                    races.push(RaceEntry {
                        name: name.to_string(),
                        has_full: false,
                        has_half: false,
                    });
                    races.len() - 1
                }
            };
            match row.event_type {
                EventType::Full => races[idx].has_full = true,
                EventType::Half => races[idx].has_half = true,
            }
        }
        debug!(races = races.len(), "event catalog built");
        Self { races }
    }

    pub fn races(&self) -> &[RaceEntry] {
        &self.races
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.races.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.races.len()
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    /// Exact trimmed name first, then a case-insensitive match for typed input.
    /// The returned entry carries the stored spelling.
    pub fn get(&self, race: &str) -> Option<&RaceEntry> {
        let race = race.trim();
        self.races
            .iter()
            .find(|r| r.name == race)
            .or_else(|| self.races.iter().find(|r| r.name.eq_ignore_ascii_case(race)))
    }

    /// Full when the race has Full data, else Half when it has Half data.
    pub fn default_distance(&self, race: &str) -> Option<EventType> {
        let entry = self.get(race)?;
        if entry.has_full {
            Some(EventType::Full)
        } else if entry.has_half {
            Some(EventType::Half)
        } else {
            None
        }
    }
}

/// `"Boston Marathon"` stays as is; `"Boston"` becomes `"Boston Marathon"`.
pub fn display_title(race: &str, distance: EventType) -> String {
    let race = race.trim();
    let label = distance.label();
    if race.is_empty() {
        label.to_string()
    } else if race.to_lowercase().contains(&label.to_lowercase()) {
        race.to_string()
    } else {
        format!("{race} {label}")
    }
}
