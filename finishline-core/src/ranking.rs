//! Results filter and ranking engine.
//!
//! One calculation pass: filter the table to the selected race and
//! distance, place the candidate finish time overall, within gender and
//! within division, and attach the breakdown of the filtered field.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::catalog::display_title;
use crate::config::TieRule;
use crate::domain::{EventType, RaceSelection, ResultRow, ResultTable, SelectionError};
use crate::report::{build_breakdown, Breakdown};
use crate::time::format_duration;

/// Why a calculation pass produced no result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputeError {
    #[error("no data found for {event_name} ({event_type})")]
    NoData {
        event_name: String,
        event_type: EventType,
    },

    #[error(transparent)]
    InvalidSelection(#[from] SelectionError),
}

/// A place within a cohort of `total` finishers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub place: usize,
    pub total: usize,
}

impl Placement {
    /// Share of the cohort finishing behind this place, clamped to [0, 100].
    pub fn percentile(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let behind = self.total as f64 - self.place as f64;
        (behind / self.total as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// "Top X%": lower is better.
    pub fn top_percent(&self) -> f64 {
        100.0 - self.percentile()
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} of {}", self.place, self.total)
    }
}

/// A sub-ranking that may have no qualifying runners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standing {
    Placed(Placement),
    /// Zero qualifying rows. A valid result, shown as "N/A".
    NotApplicable,
}

impl Standing {
    pub fn placement(&self) -> Option<Placement> {
        match self {
            Standing::Placed(p) => Some(*p),
            Standing::NotApplicable => None,
        }
    }

    pub fn total(&self) -> usize {
        self.placement().map_or(0, |p| p.total)
    }

    pub fn top_percent(&self) -> Option<f64> {
        self.placement().map(|p| p.top_percent())
    }

    pub fn place_text(&self) -> String {
        match self {
            Standing::Placed(p) => format!("#{}", p.place),
            Standing::NotApplicable => "#N/A".to_string(),
        }
    }

    pub fn top_text(&self) -> String {
        match self.top_percent() {
            Some(top) => format!("Top {top:.1}%"),
            None => "Top N/A".to_string(),
        }
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Standing::Placed(p) => p.fmt(f),
            Standing::NotApplicable => f.write_str("N/A"),
        }
    }
}

// ─── Placement rules ────────────────────────────────────────────────

/// Count of strictly faster times + 1. A tie places ahead of the tied runner.
///
/// `sorted` must be ascending.
pub fn place_strictly_faster(sorted: &[f64], finish: f64) -> usize {
    sorted.partition_point(|t| *t < finish) + 1
}

/// First index whose time is >= `finish`, + 1; the cohort size when every
/// time is faster. A tie places behind the tied runner.
///
/// `sorted` must be ascending.
pub fn place_first_at_or_slower(sorted: &[f64], finish: f64) -> usize {
    let idx = sorted.partition_point(|t| *t < finish);
    if idx == sorted.len() {
        sorted.len()
    } else {
        idx + 1
    }
}

fn place_cohort(sorted: &[f64], finish: f64, rule: TieRule) -> Standing {
    if sorted.is_empty() {
        return Standing::NotApplicable;
    }
    let place = match rule {
        TieRule::Unified => place_strictly_faster(sorted, finish),
        TieRule::Legacy => place_first_at_or_slower(sorted, finish),
    };
    Standing::Placed(Placement {
        place,
        total: sorted.len(),
    })
}

/// Parsed chip times of `rows`, ascending. Rows without a time are skipped.
pub fn sorted_times<'a>(rows: impl IntoIterator<Item = &'a ResultRow>) -> Vec<f64> {
    let mut times: Vec<f64> = rows
        .into_iter()
        .filter_map(|r| r.chip_time_seconds)
        .map(f64::from)
        .collect();
    times.sort_by(f64::total_cmp);
    times
}

// ─── Field ──────────────────────────────────────────────────────────

/// Rows of one race at one distance, with their sorted chip times.
#[derive(Debug, Clone)]
pub struct Field<'a> {
    pub rows: Vec<&'a ResultRow>,
    pub times: Vec<f64>,
}

impl<'a> Field<'a> {
    /// Exact match on the trimmed event name and on distance.
    pub fn select(table: &'a ResultTable, event_name: &str, event_type: EventType) -> Self {
        let event_name = event_name.trim();
        let rows: Vec<&ResultRow> = table
            .iter()
            .filter(|r| r.event_name.trim() == event_name && r.event_type == event_type)
            .collect();
        let times = sorted_times(rows.iter().copied());
        Self { rows, times }
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn gender_times(&self, selection: &RaceSelection) -> Vec<f64> {
        sorted_times(
            self.rows
                .iter()
                .copied()
                .filter(|r| r.ranking_gender() == selection.gender),
        )
    }

    /// Division cohort: plain gender column and stored bracket label both match.
    pub fn division_times(&self, selection: &RaceSelection) -> Vec<f64> {
        let label = selection.age_range_label();
        sorted_times(self.rows.iter().copied().filter(|r| {
            r.gender == selection.gender
                && r.age_range_label.as_deref().map(str::trim) == Some(label.as_str())
        }))
    }
}

// ─── Candidate ──────────────────────────────────────────────────────

/// Output of one calculation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub selection: RaceSelection,
    pub finish_time_seconds: f64,
    pub overall: Placement,
    pub gender: Standing,
    pub division: Standing,
    /// e.g. "M30-34"
    pub division_label: String,
    pub breakdown: Breakdown,
    /// Every parsed chip time of the field, ascending. Feeds the histogram.
    #[serde(skip)]
    pub times: Vec<f64>,
}

impl CandidateResult {
    pub fn distance_miles(&self) -> f64 {
        self.selection.distance_miles()
    }

    /// One-line headline for the result.
    pub fn summary_sentence(&self) -> String {
        format!(
            "Your estimated completion time for the {} is {}. Based on these results you'd finish around #{} out of {} (top {:.1}% overall).",
            display_title(&self.selection.event_name, self.selection.event_type),
            format_duration(self.finish_time_seconds),
            self.overall.place,
            self.overall.total,
            self.overall.top_percent(),
        )
    }
}

/// Run one calculation pass over `table` for `selection`.
///
/// Fails with [`ComputeError::NoData`] when the race/distance has no rows
/// with a usable chip time; nothing else is computed in that case.
pub fn compute_candidate(
    table: &ResultTable,
    selection: &RaceSelection,
    tie_rule: TieRule,
) -> Result<CandidateResult, ComputeError> {
    compute_candidate_at(table, selection, selection.finish_time_seconds(), tie_rule)
}

/// Same pass with an explicit finish time instead of pace × distance.
pub fn compute_candidate_at(
    table: &ResultTable,
    selection: &RaceSelection,
    finish: f64,
    tie_rule: TieRule,
) -> Result<CandidateResult, ComputeError> {
    selection.validate()?;

    let field = Field::select(table, &selection.event_name, selection.event_type);
    if field.is_empty() {
        debug!(
            event = %selection.event_name,
            distance = %selection.event_type,
            rows = field.rows.len(),
            "no usable results for selection"
        );
        return Err(ComputeError::NoData {
            event_name: selection.event_name.clone(),
            event_type: selection.event_type,
        });
    }

    let overall = Placement {
        place: place_strictly_faster(&field.times, finish),
        total: field.times.len(),
    };
    let gender = place_cohort(&field.gender_times(selection), finish, tie_rule);
    let division = place_cohort(&field.division_times(selection), finish, tie_rule);
    let breakdown = build_breakdown(&field.rows, &field.times);

    debug!(
        finish_time = finish,
        overall = %overall,
        gender = %gender,
        division = %division,
        "candidate placed"
    );

    Ok(CandidateResult {
        selection: selection.clone(),
        finish_time_seconds: finish,
        overall,
        gender,
        division,
        division_label: selection.division_label(),
        breakdown,
        times: field.times,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Gender;

    fn row(name: &str, ty: EventType, secs: Option<u32>, gender: Gender, bracket: &str) -> ResultRow {
        ResultRow {
            event_name: name.into(),
            event_type: ty,
            chip_time_seconds: secs,
            gender,
            place_gender_raw: None,
            age: bracket.split('-').next().and_then(|a| a.parse().ok()),
            age_range_label: Some(bracket.into()),
            place_division_raw: None,
            pace_seconds_per_mile: None,
        }
    }

    fn toy_table() -> ResultTable {
        ResultTable::new(vec![
            row("Toy", EventType::Full, Some(60), Gender::M, "30-34"),
            row("Toy", EventType::Full, Some(65), Gender::F, "30-34"),
            row("Toy", EventType::Full, Some(70), Gender::M, "30-34"),
            row("Toy", EventType::Full, Some(75), Gender::F, "25-29"),
            row("Toy", EventType::Full, Some(80), Gender::M, "35-39"),
            row("Toy", EventType::Half, Some(30), Gender::M, "30-34"),
            row("Other", EventType::Full, Some(10), Gender::M, "30-34"),
        ])
    }

    fn toy_selection(gender: Gender, age: u32) -> RaceSelection {
        RaceSelection::new("Toy", EventType::Full, gender, age, 9.0).unwrap()
    }

    fn run(table: &ResultTable, secs: f64, gender: Gender, age: u32, rule: TieRule) -> CandidateResult {
        compute_candidate_at(table, &toy_selection(gender, age), secs, rule).unwrap()
    }

    #[test]
    fn overall_counts_strictly_faster() {
        let times = [60.0, 65.0, 70.0, 75.0, 80.0];
        assert_eq!(place_strictly_faster(&times, 70.0), 3);
        assert_eq!(place_strictly_faster(&times, 10.0), 1);
        assert_eq!(place_strictly_faster(&times, 90.0), 6);

        let p = Placement { place: 3, total: 5 };
        assert!((p.percentile() - 40.0).abs() < 1e-9);
        assert!((p.top_percent() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn legacy_rule_places_ties_behind() {
        let times = [60.0, 65.0, 70.0, 70.0, 80.0];
        assert_eq!(place_first_at_or_slower(&times, 70.0), 3);
        assert_eq!(place_first_at_or_slower(&times, 71.0), 5);
        assert_eq!(place_first_at_or_slower(&times, 81.0), 5);
        assert_eq!(place_first_at_or_slower(&times, 1.0), 1);
    }

    #[test]
    fn percentile_is_clamped_past_last_place() {
        let p = Placement { place: 6, total: 5 };
        assert_eq!(p.percentile(), 0.0);
        assert_eq!(p.top_percent(), 100.0);
        assert_eq!(Placement { place: 1, total: 0 }.percentile(), 0.0);
    }

    #[test]
    fn computes_full_candidate() {
        let table = toy_table();
        let result = run(&table, 70.0, Gender::M, 32, TieRule::Unified);

        assert_eq!(result.overall, Placement { place: 3, total: 5 });
        assert!((result.overall.top_percent() - 60.0).abs() < 1e-6);
        // Men: 60, 70, 80 -> one strictly faster.
        assert_eq!(result.gender, Standing::Placed(Placement { place: 2, total: 3 }));
        // M30-34: 60, 70.
        assert_eq!(result.division, Standing::Placed(Placement { place: 2, total: 2 }));
        assert_eq!(result.division_label, "M30-34");
        assert_eq!(result.times, vec![60.0, 65.0, 70.0, 75.0, 80.0]);
        assert_eq!(
            result.summary_sentence(),
            "Your estimated completion time for the Toy Marathon is 1m. Based on these results \
             you'd finish around #3 out of 5 (top 60.0% overall)."
        );
    }

    #[test]
    fn legacy_rule_applies_only_to_sub_rankings() {
        let table = toy_table();
        let result = run(&table, 70.0, Gender::M, 32, TieRule::Legacy);
        assert_eq!(result.overall.place, 3);
        assert_eq!(result.gender, Standing::Placed(Placement { place: 2, total: 3 }));

        let result = run(&table, 85.0, Gender::M, 32, TieRule::Legacy);
        assert_eq!(result.overall.place, 6);
        assert_eq!(result.gender, Standing::Placed(Placement { place: 3, total: 3 }));
        // Division follows the same at-or-slower rule, not strict counting.
        assert_eq!(result.division, Standing::Placed(Placement { place: 2, total: 2 }));
        let unified = run(&table, 85.0, Gender::M, 32, TieRule::Unified);
        assert_eq!(unified.division, Standing::Placed(Placement { place: 3, total: 2 }));
    }

    #[test]
    fn empty_division_is_not_applicable() {
        let table = toy_table();
        let result = run(&table, 70.0, Gender::F, 62, TieRule::Unified);
        assert_eq!(result.division, Standing::NotApplicable);
        assert_eq!(result.division.to_string(), "N/A");
        assert_eq!(result.division.top_text(), "Top N/A");
        assert_eq!(result.division_label, "F60-64");
    }

    #[test]
    fn unknown_race_is_no_data() {
        let table = toy_table();
        let sel = RaceSelection::new("X", EventType::Full, Gender::M, 30, 9.0).unwrap();
        let err = compute_candidate(&table, &sel, TieRule::Unified).unwrap_err();
        assert_eq!(
            err,
            ComputeError::NoData {
                event_name: "X".into(),
                event_type: EventType::Full
            }
        );
    }

    #[test]
    fn rows_without_times_do_not_count() {
        let table = ResultTable::new(vec![
            row("Toy", EventType::Full, None, Gender::M, "30-34"),
            row("Toy", EventType::Full, Some(100), Gender::M, "30-34"),
        ]);
        let result = run(&table, 50.0, Gender::M, 30, TieRule::Unified);
        assert_eq!(result.overall, Placement { place: 1, total: 1 });

        let only_bad = ResultTable::new(vec![row("Toy", EventType::Full, None, Gender::M, "30-34")]);
        assert!(matches!(
            compute_candidate(&only_bad, &toy_selection(Gender::M, 30), TieRule::Unified),
            Err(ComputeError::NoData { .. })
        ));
    }

    #[test]
    fn sub_totals_never_exceed_overall() {
        let table = toy_table();
        for gender in [Gender::M, Gender::F] {
            let r = run(&table, 72.0, gender, 31, TieRule::Unified);
            assert!(r.gender.total() <= r.overall.total);
            assert!(r.division.total() <= r.overall.total);
        }
    }

    #[test]
    fn every_catalog_distance_has_a_field() {
        let table = ResultTable::new(vec![
            row("City Run", EventType::Full, Some(100), Gender::M, "30-34"),
            row("CITY RUN", EventType::Half, Some(50), Gender::F, "30-34"),
            row(" City Run", EventType::Full, Some(110), Gender::F, "25-29"),
        ]);
        let catalog = crate::catalog::EventCatalog::from_rows(&table);
        assert_eq!(catalog.len(), 2);
        for entry in catalog.races() {
            for distance in entry.distances() {
                let selection = RaceSelection::new(&entry.name, distance, Gender::M, 30, 9.0).unwrap();
                assert!(
                    compute_candidate(&table, &selection, TieRule::Unified).is_ok(),
                    "{} ({distance}) listed but not rankable",
                    entry.name
                );
            }
        }
        let full = RaceSelection::new("City Run", EventType::Full, Gender::M, 30, 9.0).unwrap();
        let result = compute_candidate(&table, &full, TieRule::Unified).unwrap();
        assert_eq!(result.overall.total, 2);
    }

    #[test]
    fn json_omits_the_raw_times() {
        let r = run(&toy_table(), 72.0, Gender::F, 70, TieRule::Unified);
        let value = serde_json::to_value(&r).unwrap();
        assert!(value.get("times").is_none());
        assert_eq!(value["overall"]["place"], 4);
        assert_eq!(value["division"], "NotApplicable");
        assert_eq!(value["gender"]["Placed"]["total"], 2);
    }
}
