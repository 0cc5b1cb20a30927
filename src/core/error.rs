//! Defines the custom error type for the `core` module.

use std::path::{PathBuf, StripPrefixError};
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Only job-level failures surface as a `CoreError`. Per-file failures during a
/// copy pass are logged and skipped, so they never abort a run.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Represents an I/O error, typically from file system operations.
    #[error("I/O error for path {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),

    /// A required input (source or destination) was not provided.
    #[error("No {0} folder selected")]
    MissingInput(&'static str),

    /// Represents a path that was expected to be a directory but was not.
    #[error("Path is not a valid directory: {0}")]
    NotADirectory(PathBuf),

    /// The destination resolves to the source folder itself.
    #[error("Source and destination are the same folder: {0}")]
    SameFolder(PathBuf),

    /// Represents a failure to (de)serialize an exported structure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Represents a failure to strip a path prefix.
    #[error("Failed to strip prefix from path: {0}")]
    PathStrip(#[from] StripPrefixError),

    /// Represents an error that occurred when a Tokio task was joined.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type CoreResult<T> = Result<T, CoreError>;
