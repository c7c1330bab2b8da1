//! Results ingestion: sources, providers, CSV parsing.

pub mod ingest;
pub mod provider;

pub use ingest::{ingest_reader, ingest_str, load, split_age, IngestReport};
pub use provider::{DataError, DataSource, FileProvider, HttpProvider, ResultsProvider};
