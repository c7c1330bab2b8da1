//! Field breakdown: descriptive cards over the filtered race.
//!
//! Age, gender mix, most common divisions, finish times and paces. Each
//! card degrades to placeholder text when its column is absent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::ResultRow;
use crate::stats::{Bucket, Summary};
use crate::time::{format_duration, format_pace};

/// Number of divisions listed on the division card.
pub const TOP_DIVISIONS: usize = 5;

const PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderShare {
    pub label: String,
    pub count: usize,
    /// Share of the filtered field, 0..=100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub field_size: usize,
    pub age: Summary,
    /// Descending by share, then label.
    pub genders: Vec<GenderShare>,
    /// Top divisions by count, then label.
    pub divisions: Vec<DivisionCount>,
    /// Seconds; mode on a one-minute grid.
    pub finish_time: Summary,
    /// Seconds per mile; mode on a five-second grid.
    pub pace: Summary,
}

/// Build every card from the filtered rows and their sorted chip times.
pub fn build_breakdown(rows: &[&ResultRow], times: &[f64]) -> Breakdown {
    let ages: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.age)
        .filter(|a| *a > 0)
        .map(f64::from)
        .collect();
    let paces: Vec<f64> = rows.iter().filter_map(|r| r.pace_or_derived()).collect();

    Breakdown {
        field_size: rows.len(),
        age: Summary::compute(&ages, Bucket::Exact),
        genders: gender_shares(rows),
        divisions: top_divisions(rows, TOP_DIVISIONS),
        finish_time: Summary::compute(times, Bucket::Nearest(60.0)),
        pace: Summary::compute(&paces, Bucket::Nearest(5.0)),
    }
}

/// Count of each gender value; rows without one count as "Unknown".
pub fn gender_shares(rows: &[&ResultRow]) -> Vec<GenderShare> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for r in rows {
        *counts.entry(r.gender.to_string()).or_default() += 1;
    }
    let total = rows.len().max(1) as f64;
    let mut shares: Vec<GenderShare> = counts
        .into_iter()
        .map(|(label, count)| GenderShare {
            label,
            count,
            percent: count as f64 / total * 100.0,
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    shares
}

/// Most frequent cleaned division labels.
pub fn top_divisions(rows: &[&ResultRow], limit: usize) -> Vec<DivisionCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in rows.iter().filter_map(|r| r.division_label()) {
        *counts.entry(label).or_default() += 1;
    }
    let mut divisions: Vec<DivisionCount> = counts
        .into_iter()
        .map(|(label, count)| DivisionCount { label, count })
        .collect();
    divisions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    divisions.truncate(limit);
    divisions
}

// ─── Card text ──────────────────────────────────────────────────────

impl Breakdown {
    pub fn age_card(&self) -> Vec<String> {
        if self.age.is_empty() {
            return vec!["Average: —".into(), "Median: —".into(), "Mode: —".into()];
        }
        vec![
            format!("Average: {:.0}", self.age.mean),
            format!("Median: {}", opt(self.age.median, |v| format!("{v:.0}"))),
            format!("Mode: {}", opt(self.age.mode, |v| format!("{v:.0}"))),
        ]
    }

    pub fn gender_card(&self) -> Vec<String> {
        if self.genders.is_empty() {
            return vec![PLACEHOLDER.into()];
        }
        self.genders
            .iter()
            .map(|g| format!("{}: {} ({:.1}%)", g.label, g.count, g.percent))
            .collect()
    }

    pub fn division_card(&self) -> Vec<String> {
        if self.divisions.is_empty() {
            return vec!["No division data".into()];
        }
        self.divisions
            .iter()
            .map(|d| format!("{}: {}", d.label, d.count))
            .collect()
    }

    pub fn finish_time_card(&self) -> Vec<String> {
        summary_lines(&self.finish_time, format_duration)
    }

    pub fn pace_card(&self) -> Vec<String> {
        summary_lines(&self.pace, format_pace)
    }
}

fn opt(value: Option<f64>, fmt: impl Fn(f64) -> String) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), fmt)
}

fn summary_lines(summary: &Summary, fmt: fn(f64) -> String) -> Vec<String> {
    if summary.is_empty() {
        return vec!["Average: —".into(), "Median: —".into(), "Mode: —".into()];
    }
    vec![
        format!("Average: {}", fmt(summary.mean)),
        format!("Median: {}", opt(summary.median, fmt)),
        format!("Mode: {}", opt(summary.mode, fmt)),
    ]
}
