//! cw-results: typed sample records, ingestion, wash log and run storage.

pub mod hash;
pub mod ingest;
pub mod store;
pub mod types;
pub mod washes;

pub use hash::compute_run_id;
pub use ingest::{explode_wide_records, parse_numeric, parse_timestamp, read_wide_records};
pub use store::RunStore;
pub use types::*;
pub use washes::{WashLog, WashRecord, events_for};

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Invalid record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },
}
