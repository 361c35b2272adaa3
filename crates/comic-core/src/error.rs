//! Error types for comic-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in comic-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a collection file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input text is not valid JSON
    #[error("could not parse JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// Valid JSON, but neither a versioned document nor a bare array of records
    #[error("invalid collection format: {0}")]
    InvalidFormat(String),

    /// Bulk generation was rejected
    #[error(transparent)]
    Bulk(#[from] BulkError),

    /// No record with the given uuid exists in the collection
    #[error("no record with uuid '{0}'")]
    RecordNotFound(String),

    /// A batch operation was requested with nothing selected
    #[error("no records are selected")]
    EmptySelection,

    /// A save was requested while no edit session is open
    #[error("no edit in progress")]
    NotEditing,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Reasons a bulk-add request cannot produce records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BulkError {
    #[error("Issue and Ending Issue must be valid numbers for bulk add.")]
    InvalidNumber,

    #[error("Ending Issue must be greater than or equal to Issue.")]
    InvalidRange,

    #[error("Month and Year are required for bulk add.")]
    MissingDate,

    #[error("Bulk add is limited to 1000 issues at a time.")]
    TooManyIssues,

    /// Month or year is present but unusable as a starting date
    #[error("Month must be 1-12 and Year must be a whole number for bulk add.")]
    InvalidDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_errors_have_distinct_messages() {
        let messages: Vec<String> = [
            BulkError::InvalidNumber,
            BulkError::InvalidRange,
            BulkError::MissingDate,
            BulkError::TooManyIssues,
            BulkError::InvalidDate,
        ]
        .iter()
        .map(|e| e.to_string())
        .collect();

        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_bulk_error_is_transparent() {
        let err = Error::from(BulkError::InvalidRange);
        assert_eq!(err.to_string(), BulkError::InvalidRange.to_string());
    }
}
