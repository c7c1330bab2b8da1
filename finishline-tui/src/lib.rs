//! Finishline TUI - terminal front end for the placement estimator
//!
//! - Form for race, distance, gender, age and goal pace
//! - Placement, percentile and field-breakdown cards
//! - Finish-time distribution with a drag-to-compare marker (mouse or keys)
//! - Results loading on a background worker thread

pub mod app;
pub mod input;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::{AppState, Focus};
