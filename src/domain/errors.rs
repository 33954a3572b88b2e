//! Domain error types
//!
//! This module defines the error hierarchy for the publisher.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main publisher error type
///
/// This is the primary error type used throughout the application. Gateway
/// adapters convert their client errors into one of these variants so the
/// orchestrator can classify them without knowing which store failed.
#[derive(Debug, Error)]
pub enum PublisherError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Release, publication or other metadata is missing
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Relational store errors
    #[error("Database error: {0}")]
    Database(String),

    /// Object storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Notification channel errors
    #[error("Notification error: {0}")]
    Notification(String),

    /// Event bus errors
    #[error("Event bus error: {0}")]
    EventBus(String),

    /// A gateway call exceeded its caller-imposed deadline
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    /// A status update that the state machine does not allow
    #[error("Invalid publishing status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// One or more data sets could not be promoted
    #[error("{} data set(s) failed to publish", failures.len())]
    DataSetPublishing { failures: Vec<DataSetFailure> },

    /// Every release version in the batch failed
    #[error("All {count} release version(s) in the batch failed to publish")]
    AllReleasesFailed { count: usize },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl PublisherError {
    /// Shorthand for a [`PublisherError::NotFound`]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether this is a missing-metadata error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the error came from a flaky dependency (timeout, connectivity)
    ///
    /// Transient errors are still not retried within a run; the scheduler
    /// re-invokes the release with a fresh attempt id instead.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Database(_)
                | Self::Storage(_)
                | Self::Notification(_)
                | Self::EventBus(_)
        )
    }
}

/// A single data set that failed promotion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSetFailure {
    /// Data set identifier
    pub data_set_id: String,

    /// Error message
    pub message: String,
}

impl std::fmt::Display for DataSetFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.data_set_id, self.message)
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for PublisherError {
    fn from(err: std::io::Error) -> Self {
        PublisherError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PublisherError {
    fn from(err: serde_json::Error) -> Self {
        PublisherError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PublisherError {
    fn from(err: toml::de::Error) -> Self {
        PublisherError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publisher_error_display() {
        let err = PublisherError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_not_found_display() {
        let err = PublisherError::not_found("Release version", "abc");
        assert_eq!(err.to_string(), "Release version not found: abc");
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_transient_classification() {
        assert!(PublisherError::Timeout {
            operation: "complete_publishing",
            seconds: 30
        }
        .is_transient());
        assert!(PublisherError::Storage("503".to_string()).is_transient());
        assert!(PublisherError::EventBus("refused".to_string()).is_transient());
        assert!(!PublisherError::Validation("bad".to_string()).is_transient());
    }

    #[test]
    fn test_data_set_failures_display() {
        let err = PublisherError::DataSetPublishing {
            failures: vec![
                DataSetFailure {
                    data_set_id: "a".to_string(),
                    message: "locked".to_string(),
                },
                DataSetFailure {
                    data_set_id: "b".to_string(),
                    message: "missing draft".to_string(),
                },
            ],
        };
        assert_eq!(err.to_string(), "2 data set(s) failed to publish");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: PublisherError = io_err.into();
        assert!(matches!(err, PublisherError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: PublisherError = json_err.into();
        assert!(matches!(err, PublisherError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: PublisherError = toml_err.into();
        assert!(matches!(err, PublisherError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
