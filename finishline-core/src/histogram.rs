//! Fixed-width histogram over a trimmed time range.
//!
//! The slowest tail above the trim quantile is left off the chart so a few
//! walkers don't squash the field into a handful of bins. Trimming only
//! affects the picture; statistics use every time.

use serde::{Deserialize, Serialize};

/// Horizontal padding around the binned range, as a share of its width.
pub const AXIS_PADDING: f64 = 0.01;
/// Half-width of the base/compare marker bands, as a share of the range.
pub const BAND_HALF_WIDTH: f64 = 0.015;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Lower edge of each bin, seconds.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub lower: f64,
    pub upper: f64,
    /// Bin width, seconds. Zero when every binned time is equal.
    pub step: f64,
}

impl Histogram {
    /// Bin ascending `sorted` times into `bins` buckets over
    /// `[sorted[0], sorted[floor(n * trim_quantile)]]`.
    ///
    /// Times outside the range are dropped. With zero width everything in
    /// range lands in bin 0. Empty input gives empty `edges`/`counts`.
    pub fn from_sorted(sorted: &[f64], bins: usize, trim_quantile: f64) -> Self {
        if sorted.is_empty() || bins == 0 {
            return Self {
                edges: Vec::new(),
                counts: Vec::new(),
                lower: 0.0,
                upper: 0.0,
                step: 0.0,
            };
        }

        let n = sorted.len();
        let upper_idx = ((n as f64 * trim_quantile).floor() as usize).min(n - 1);
        let lower = sorted[0];
        let upper = sorted[upper_idx];
        let step = (upper - lower) / bins as f64;

        let mut counts = vec![0usize; bins];
        for &t in sorted.iter().take_while(|t| **t <= upper) {
            let idx = if step > 0.0 {
                (((t - lower) / step).floor() as usize).min(bins - 1)
            } else {
                0
            };
            counts[idx] += 1;
        }

        let edges = (0..bins).map(|i| lower + i as f64 * step).collect();

        Self {
            edges,
            counts,
            lower,
            upper,
            step,
        }
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Times that made it into a bin.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Width of the binned range, seconds.
    pub fn range(&self) -> f64 {
        self.upper - self.lower
    }

    /// Padded x-axis bounds for drawing.
    pub fn x_bounds(&self) -> [f64; 2] {
        let pad = self.range() * AXIS_PADDING;
        [self.lower - pad, self.upper + pad]
    }

    /// `[from, to]` of the marker band centred on `t`.
    pub fn band(&self, t: f64) -> [f64; 2] {
        let half = self.range() * BAND_HALF_WIDTH;
        [t - half, t + half]
    }

    /// Bin index holding `t`, if `t` is inside the binned range.
    pub fn bin_of(&self, t: f64) -> Option<usize> {
        if self.is_empty() || t < self.lower || t > self.upper {
            return None;
        }
        if self.step > 0.0 {
            Some((((t - self.lower) / self.step).floor() as usize).min(self.bins() - 1))
        } else {
            Some(0)
        }
    }

    /// `(bin centre, count)` pairs for line/area charts.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.edges
            .iter()
            .zip(&self.counts)
            .map(|(edge, count)| (edge + self.step / 2.0, *count as f64))
            .collect()
    }
}
