//! Unified error hierarchy for healthrs.
//!
//! Structured error types with a fixed taxonomy: NotFound and
//! InvalidArgument surface to the caller as-is, database and IO failures
//! carry their source, and anything unexpected during multi-record
//! aggregation becomes Internal rather than a silently partial result.

use thiserror::Error;

use crate::database::DatabaseError;
use crate::models::SnapshotValidationError;

/// Top-level error type for all healthrs operations
#[derive(Debug, Error)]
pub enum HealthRsError {
    /// No records exist for the requested subject/window
    #[error("No data found for {subject} between {start} and {end}")]
    NotFound {
        subject: String,
        start: String,
        end: String,
    },

    /// A caller-supplied parameter is out of range or malformed
    #[error("Invalid argument {parameter}: {reason}")]
    InvalidArgument { parameter: String, reason: String },

    /// Record store operation errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Snapshot failed boundary validation
    #[error("Validation error: {0}")]
    Validation(#[from] SnapshotValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error; aggregation never returns partial results
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for healthrs operations
pub type Result<T> = std::result::Result<T, HealthRsError>;

impl HealthRsError {
    /// Convenience constructor for the empty-window case
    pub fn not_found(
        subject: impl Into<String>,
        start: impl ToString,
        end: impl ToString,
    ) -> Self {
        HealthRsError::NotFound {
            subject: subject.into(),
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// Convenience constructor for bad parameters
    pub fn invalid_argument(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        HealthRsError::InvalidArgument {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Check if the operation may succeed when retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HealthRsError::Database(DatabaseError::Sqlite(_)) | HealthRsError::Io(_)
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HealthRsError::NotFound { .. } => ErrorSeverity::Warning,
            HealthRsError::InvalidArgument { .. } => ErrorSeverity::Warning,
            HealthRsError::Validation(_) => ErrorSeverity::Warning,
            HealthRsError::Database(_) => ErrorSeverity::Error,
            HealthRsError::Io(_) => ErrorSeverity::Error,
            HealthRsError::Configuration(_) => ErrorSeverity::Error,
            HealthRsError::Internal(_) => ErrorSeverity::Critical,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            HealthRsError::NotFound {
                subject,
                start,
                end,
            } => {
                format!(
                    "No biometric data recorded for {} between {} and {}. \
                     Sync your device and try again.",
                    subject, start, end
                )
            }
            HealthRsError::InvalidArgument { parameter, reason } => {
                format!("The value for {} is invalid: {}", parameter, reason)
            }
            HealthRsError::Database(_) => {
                "Unable to access the record store. Please check your configuration.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents the operation but the system can continue
    Error,
    /// Warning that does not prevent other operations
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical | ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_severity_and_message() {
        let err = HealthRsError::not_found("user@example.com", "2025-01-01", "2025-01-07");
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert!(err.user_message().contains("No biometric data"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_invalid_argument_formatting() {
        let err = HealthRsError::invalid_argument("timeframe_days", "must be >= 2");
        assert!(err.to_string().contains("timeframe_days"));
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_internal_is_critical() {
        let err = HealthRsError::Internal("aggregation failed".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::ERROR);
    }
}
