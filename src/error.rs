//! Error types for record cleaning operations.
//!
//! This module provides the [`CleanError`] type for all library operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all record cleaning operations.
///
/// Covers the pipeline stages (configuration resolution, input access,
/// field transformation, output emission) as well as the structural errors
/// raised while parsing or serializing MARC data.
#[derive(Error, Debug)]
pub enum CleanError {
    /// Malformed or out-of-range configuration or override value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input file missing/unreadable, or a structurally required field
    /// was absent during context extraction.
    #[error("Input access error: {0}")]
    InputAccess(String),

    /// A repair or cleaning function failed on a subfield.
    #[error("Transform error{}: {message}", fmt_record_id(.record_id))]
    Transform {
        /// Primary identifier (001) of the record being processed, when known.
        record_id: Option<String>,
        /// Description of the failure.
        message: String,
    },

    /// An output destination could not be created or written.
    #[error("Output write error: {0}")]
    OutputWrite(String),

    /// Invalid or malformed MARC record structure.
    #[error("Invalid MARC record: {0}")]
    InvalidRecord(String),

    /// Invalid leader (24-byte header).
    #[error("Invalid leader: {0}")]
    InvalidLeader(String),

    /// Invalid field structure.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Character encoding conversion failure.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Truncated or incomplete record.
    #[error("Truncated record: {0}")]
    Truncated(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_record_id(record_id: &Option<String>) -> String {
    match record_id {
        Some(id) => format!(" in record {id}"),
        None => String::new(),
    }
}

/// Convenience type alias for [`std::result::Result`] with [`CleanError`].
pub type Result<T> = std::result::Result<T, CleanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_error_includes_record_id() {
        let err = CleanError::Transform {
            record_id: Some("ocm123".to_string()),
            message: "unpaired surrogate".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("ocm123"), "got: {rendered}");
        assert!(rendered.contains("unpaired surrogate"));
    }

    #[test]
    fn test_transform_error_without_record_id() {
        let err = CleanError::Transform {
            record_id: None,
            message: "bad data".to_string(),
        };
        assert_eq!(err.to_string(), "Transform error: bad data");
    }
}
