//! Descriptive statistics: pure functions, total on empty input.
//!
//! Upstream filters can legitimately produce empty subsets (a rare
//! division, a race with no ages recorded), so none of these panic:
//! `mean` falls back to 0.0 and `median`/`mode` return `None`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Arithmetic mean over the finite values; 0.0 when there are none.
pub fn mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    sum / count.max(1) as f64
}

/// Median over the finite values: middle element, or the average of the
/// two middle elements for an even count.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// How values are grouped before counting frequencies.
///
/// Near-continuous data (finish times, paces) almost never repeats exactly,
/// so it is rounded to a coarser grid first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bucket {
    /// Round to the nearest whole unit.
    Exact,
    /// Round to the nearest multiple of `step` (e.g. 5 s, 60 s).
    Nearest(f64),
}

impl Bucket {
    /// Key on the bucket grid; two values share a bucket iff their keys match.
    fn key(self, v: f64) -> i64 {
        match self {
            Bucket::Exact => v.round() as i64,
            Bucket::Nearest(step) if step > 0.0 => (v / step).round() as i64,
            Bucket::Nearest(_) => v.round() as i64,
        }
    }

    /// Bucket key back in the original units.
    fn value(self, key: i64) -> f64 {
        match self {
            Bucket::Nearest(step) if step > 0.0 => key as f64 * step,
            _ => key as f64,
        }
    }
}

/// Most frequent bucket and how many values fell into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    pub value: f64,
    pub count: usize,
}

/// Most frequent bucketed value; ties go to the smallest bucket.
pub fn mode(values: &[f64], bucket: Bucket) -> Option<Mode> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for v in values.iter().filter(|v| v.is_finite()) {
        *counts.entry(bucket.key(*v)).or_default() += 1;
    }

    // Ascending key order + strict comparison keeps the smallest key on ties.
    let mut best: Option<(i64, usize)> = None;
    for (key, count) in counts {
        match best {
            Some((_, c)) if count <= c => {}
            _ => best = Some((key, count)),
        }
    }

    best.map(|(key, count)| Mode {
        value: bucket.value(key),
        count,
    })
}

/// Mean / median / mode of one measure, as shown on a breakdown card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f64,
    pub median: Option<f64>,
    pub mode: Option<f64>,
    pub count: usize,
}

impl Summary {
    pub fn compute(values: &[f64], bucket: Bucket) -> Self {
        Self {
            mean: mean(values),
            median: median(values),
            mode: mode(values, bucket).map(|m| m.value),
            count: values.iter().filter(|v| v.is_finite()).count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
