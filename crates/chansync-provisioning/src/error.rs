//! Provisioning error types.

use chansync_connector::error::{ConnectorError, DirectoryError, LookupError};
use thiserror::Error;

/// Failure of a single mapping. The run records it and moves on.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Directory query failed; the mapping is skipped, never read as "nobody".
    #[error("Directory query failed: {0}")]
    Directory(#[from] DirectoryError),

    /// Channel lookup or membership read failed.
    #[error("Channel lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// Mapping definition is unusable.
    #[error("Invalid mapping '{label}': {message}")]
    InvalidMapping { label: String, message: String },
}

impl MappingError {
    /// Create an invalid mapping error.
    pub fn invalid(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMapping {
            label: label.into(),
            message: message.into(),
        }
    }

    /// Get an error code for reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            MappingError::Directory(e) => e.error_code(),
            MappingError::Lookup(e) => e.error_code(),
            MappingError::InvalidMapping { .. } => "INVALID_MAPPING",
        }
    }
}

/// Failure that aborts the whole run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The account index could not be built; nothing can be reconciled.
    #[error("Failed to build account index: {0}")]
    AccountIndex(#[source] ConnectorError),

    /// Mapping labels passed as a filter do not exist.
    #[error("Unknown mapping(s): {}", labels.join(", "))]
    UnknownMappings { labels: Vec<String> },

    /// Mapping definitions failed validation.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl SyncError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Result type for run-level operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chansync_connector::types::{ChannelPattern, Visibility};

    #[test]
    fn test_error_display() {
        let err = MappingError::invalid("ops", "ldap_query is empty");
        assert!(err.to_string().contains("ops"));
        assert!(err.to_string().contains("ldap_query is empty"));

        let err = SyncError::UnknownMappings {
            labels: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Unknown mapping(s): a, b");
    }

    #[test]
    fn test_error_codes() {
        let err = MappingError::from(LookupError::ChannelNotFound {
            pattern: ChannelPattern::exact("ops"),
            visibility: Visibility::Private,
        });
        assert_eq!(err.error_code(), "CHANNEL_NOT_FOUND");

        let err = MappingError::from(DirectoryError::Unavailable(
            ConnectorError::AuthenticationFailed,
        ));
        assert_eq!(err.error_code(), "DIRECTORY_UNAVAILABLE");

        assert_eq!(
            MappingError::invalid("x", "y").error_code(),
            "INVALID_MAPPING"
        );
    }
}
