//! Deterministic synthetic race fields for demos, benches and tests.
//!
//! Same seed, same field. Times are roughly bell-shaped around a typical
//! finish with a long slow tail; nothing here is real data.

use std::collections::HashMap;
use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{age_range_label, EventType, Gender, ResultRow, ResultTable};
use crate::schema;
use crate::time::{format_clock, format_pace_input};

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub race: String,
    pub distance: EventType,
    pub runners: usize,
    pub seed: u64,
}

impl FieldSpec {
    pub fn new(race: impl Into<String>, distance: EventType, runners: usize, seed: u64) -> Self {
        Self {
            race: race.into(),
            distance,
            runners,
            seed,
        }
    }
}

/// Typical finish time and spread, seconds.
fn profile(distance: EventType) -> (f64, f64) {
    match distance {
        EventType::Full => (16_200.0, 2_700.0),
        EventType::Half => (7_800.0, 1_300.0),
    }
}

/// Approximate standard normal: sum of twelve uniforms minus six.
fn standard_normal(rng: &mut StdRng) -> f64 {
    (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0
}

/// Generate one race field.
pub fn generate_field(spec: &FieldSpec) -> Vec<ResultRow> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let (center, spread) = profile(spec.distance);
    let miles = spec.distance.distance_miles();

    let mut rows: Vec<ResultRow> = (0..spec.runners)
        .map(|_| {
            let gender = if rng.gen_bool(0.55) { Gender::M } else { Gender::F };
            let age: u32 = rng.gen_range(18..=75);
            let mut z = standard_normal(&mut rng);
            // Skew: slow runners trail further than fast ones lead.
            if z > 0.0 {
                z *= 1.4;
            }
            let offset = if gender == Gender::F { spread * 0.25 } else { 0.0 };
            let secs = (center + offset + z * spread).max(center * 0.45).round() as u32;
            ResultRow {
                event_name: spec.race.clone(),
                event_type: spec.distance,
                chip_time_seconds: Some(secs),
                gender,
                place_gender_raw: None,
                age: Some(age),
                age_range_label: Some(age_range_label(age)),
                place_division_raw: None,
                pace_seconds_per_mile: Some((secs as f64 / miles).round()),
            }
        })
        .collect();

    rows.sort_by_key(|r| r.chip_time_seconds);

    let mut gender_rank: HashMap<Gender, usize> = HashMap::new();
    let mut division_rank: HashMap<String, usize> = HashMap::new();
    for row in &mut rows {
        let g = gender_rank.entry(row.gender).or_default();
        *g += 1;
        row.place_gender_raw = Some(format!("{} {}", g, row.gender));

        let label = format!(
            "{}{}",
            row.gender.initial(),
            row.age_range_label.as_deref().unwrap_or_default()
        );
        let d = division_rank.entry(label.clone()).or_default();
        *d += 1;
        row.place_division_raw = Some(format!("{d} {label}"));
    }
    rows
}

/// Several fields merged into one table.
pub fn generate_table(specs: &[FieldSpec]) -> ResultTable {
    ResultTable::new(specs.iter().flat_map(generate_field).collect())
}

/// A small two-race table with both distances for the first race.
pub fn demo_table(seed: u64) -> ResultTable {
    generate_table(&[
        FieldSpec::new("Lakeshore", EventType::Full, 1_800, seed),
        FieldSpec::new("Lakeshore", EventType::Half, 2_400, seed.wrapping_add(1)),
        FieldSpec::new("Riverbend Half Marathon", EventType::Half, 900, seed.wrapping_add(2)),
    ])
}

/// Write rows in the results CSV layout.
pub fn write_csv<W: Write>(rows: &[ResultRow], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(schema::RESULTS_SCHEMA.iter().map(|f| f.name))?;
    for r in rows {
        let age = r
            .age_range_label
            .clone()
            .or_else(|| r.age.map(|a| a.to_string()))
            .unwrap_or_default();
        let pace = r
            .pace_seconds_per_mile
            .map(|p| format_pace_input(p / 60.0))
            .unwrap_or_default();
        wtr.write_record([
            r.event_name.clone(),
            r.event_type.label().to_string(),
            r.chip_time_seconds
                .map(|t| format_clock(f64::from(t)))
                .unwrap_or_default(),
            r.gender.initial().to_string(),
            r.place_gender_raw.clone().unwrap_or_default(),
            age,
            r.place_division_raw.clone().unwrap_or_default(),
            pace,
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_field() {
        let spec = FieldSpec::new("Test", EventType::Full, 200, 7);
        assert_eq!(generate_field(&spec), generate_field(&spec));
        let other = FieldSpec::new("Test", EventType::Full, 200, 8);
        assert_ne!(generate_field(&spec), generate_field(&other));
    }

    #[test]
    fn field_is_sorted_and_ranked() {
        let rows = generate_field(&FieldSpec::new("Test", EventType::Half, 300, 1));
        assert_eq!(rows.len(), 300);
        assert!(rows
            .windows(2)
            .all(|w| w[0].chip_time_seconds <= w[1].chip_time_seconds));
        let first = &rows[0];
        assert!(first
            .place_gender_raw
            .as_deref()
            .is_some_and(|p| p.starts_with("1 ")));
        assert_eq!(first.ranking_gender(), first.gender);
        assert!(rows.iter().all(|r| r.division_label().is_some()));
    }

    #[test]
    fn writes_every_column() {
        let rows = generate_field(&FieldSpec::new("Test", EventType::Half, 3, 1));
        let mut buf = Vec::new();
        write_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("event_name,event_type,Chip Time,Gender,Place Gender,Age,Place Div,Pace (min/miles)")
        );
        assert_eq!(lines.count(), 3);
    }
}
