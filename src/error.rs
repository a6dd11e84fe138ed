//! Error types for each pipeline stage.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid invocation parameters, reported before any log is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("container mapping is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("container mapping must be a JSON object of {{\"NAME\": \"CONTAINER\"}}")]
    NotAnObject,

    #[error("container mapping is empty")]
    EmptyMapping,

    #[error("container mapping value for '{0}' must be a string")]
    NonStringValue(String),

    #[error("x-axis duration must be > 0")]
    ZeroDuration,
}

/// Failures while reading a directory of stats logs.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: file name has no replica count between the last '_' and the extension", .0.display())]
    MissingReplicaCount(PathBuf),

    #[error("{}: replica count {count} already loaded from another file", .path.display())]
    DuplicateReplicaCount { path: PathBuf, count: u32 },

    #[error("{}: file is empty, expected a header row", .0.display())]
    MissingHeader(PathBuf),

    #[error("{}: header has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{}:{line}: expected {expected} fields, found {found}", .path.display())]
    FieldCount {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{}:{line}: malformed '{column}' value '{value}'", .path.display())]
    MalformedField {
        path: PathBuf,
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// Failures while computing chart bounds.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no log rows found for any requested container ({})", .0.join(", "))]
    NoData(Vec<String>),
}
