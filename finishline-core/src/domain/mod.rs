//! Domain types: finisher rows, the results table, and the user's query.

pub mod row;
pub mod selection;

pub use row::{EventType, Gender, ResultRow, ResultTable};
pub use selection::{age_range_label, RaceSelection, SelectionError};
