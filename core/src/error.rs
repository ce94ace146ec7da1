//! Error types for bench-charts-core

use std::path::PathBuf;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// A required input file does not exist
    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// The CSV header lacks required columns
    #[error("{} is missing columns: {}", .path.display(), .columns.join(", "))]
    MissingColumns {
        /// File that was loaded
        path: PathBuf,
        /// Missing column names, sorted
        columns: Vec<String>,
    },

    /// A row could not be interpreted
    #[error("{}: line {line}: {reason}", .path.display())]
    InvalidRow {
        /// File that was loaded
        path: PathBuf,
        /// 1-based line number (header is line 1), or 0 when not line oriented
        line: u64,
        /// What was wrong with the row
        reason: String,
    },

    /// Two measurements landed in the same pivot cell
    #[error("duplicate measurement for {aggregator} at dataset size {dataset_size} (delay {delay_millis} ms)")]
    DuplicateMeasurement {
        /// Delay tier
        delay_millis: u64,
        /// Full aggregator identifier
        aggregator: String,
        /// Dataset size
        dataset_size: u64,
    },

    /// Plot configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
