//! Finishline Core: race results ingestion, placement and percentile
//! statistics, histogram binning and the drag-to-compare state machine.
//!
//! - Time codec and descriptive statistics (pure, total on empty input)
//! - Results filter and ranking engine (overall / gender / division)
//! - Field breakdown cards
//! - Fixed-width histogram over a trimmed range
//! - Drag controller behind a narrow render-sink trait
//! - CSV ingestion from a path or URL, race catalog, TOML config

pub mod catalog;
pub mod config;
pub mod data;
pub mod domain;
pub mod drag;
pub mod histogram;
pub mod ranking;
pub mod report;
pub mod schema;
pub mod stats;
pub mod synthetic;
pub mod time;

pub use catalog::{display_title, EventCatalog, RaceEntry};
pub use config::{ConfigError, EstimatorConfig, TieRule};
pub use data::{DataError, DataSource, IngestReport};
pub use domain::{EventType, Gender, RaceSelection, ResultRow, ResultTable, SelectionError};
pub use drag::{
    ChartState, DragController, DragState, HintCue, LiveLabel, PointerPhase, PointerSample,
    RenderSink,
};
pub use histogram::Histogram;
pub use ranking::{compute_candidate, compute_candidate_at, CandidateResult, ComputeError, Placement, Standing};
pub use report::Breakdown;
pub use time::{format_clock, format_duration, format_pace, parse_clock, TimeParseError};
