//! Unified error handling for the eco-trails library.
//!
//! The store never lets these escape from `load()` or `export()`; they are
//! logged there and degraded to an empty collection or a `false` result.
//! The fallible entry points (`try_load`, `write_export`, `require_by_id`)
//! return them directly.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for eco-trails operations.
#[derive(Debug, Error)]
pub enum TrailError {
    /// Identifier lookup miss
    #[error("Trail '{id}' not found")]
    NotFound { id: String },

    /// Source payload has the wrong shape
    #[error("Invalid data format: {message}")]
    Format { message: String },

    /// A source record failed a load-time admission rule
    #[error("Record at position {index} rejected: {reason}")]
    RecordInvalid { index: usize, reason: String },

    /// File missing, unreadable or unwritable
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON or serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrailError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        TrailError::Format {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrailError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for eco-trails operations.
pub type Result<T> = std::result::Result<T, TrailError>;

/// Extension trait for converting Option to TrailError.
pub trait OptionExt<T> {
    /// Convert Option to Result with a not-found error for the given id.
    fn ok_or_not_found(self, id: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, id: &str) -> Result<T> {
        self.ok_or_else(|| TrailError::NotFound { id: id.to_string() })
    }
}
