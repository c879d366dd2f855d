//! Connector error types
//!
//! Error definitions for the directory and chat-platform collaborators, with
//! transient/permanent classification so operators can tell a flaky network
//! from a broken configuration.

use thiserror::Error;

use crate::types::{ChannelPattern, Visibility};

/// Error that can occur while talking to a target system.
#[derive(Debug, Error)]
pub enum ConnectorError {
    // Connection errors (usually transient)
    /// Failed to establish connection to target system.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Connection timed out.
    #[error("connection timeout after {timeout_secs} seconds")]
    ConnectionTimeout { timeout_secs: u64 },

    /// Target system is temporarily unavailable (rate limited, 5xx gateway).
    #[error("target system unavailable: {message}")]
    TargetUnavailable { message: String },

    /// Network error during communication.
    #[error("network error: {message}")]
    NetworkError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Authentication errors (permanent)
    /// Invalid credentials provided.
    #[error("authentication failed: invalid credentials")]
    AuthenticationFailed,

    /// Insufficient permissions for the operation.
    #[error("authorization failed: insufficient permissions for {operation}")]
    AuthorizationFailed { operation: String },

    // Configuration errors (permanent)
    /// Connector configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Connector was used after `dispose()`.
    #[error("connector has been disposed")]
    Disposed,

    // Operation errors
    /// Operation failed.
    #[error("operation failed: {message}")]
    OperationFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Object not found in target system.
    #[error("object not found: {identifier}")]
    ObjectNotFound { identifier: String },

    /// The target answered, but not with the shape the call promises.
    #[error("malformed response from {operation}: {message}")]
    MalformedResponse { operation: String, message: String },
}

impl ConnectorError {
    /// Check if this error is transient.
    ///
    /// Nothing in chansync retries automatically; the classification only
    /// tells the operator whether re-running the whole process may help.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ConnectorError::ConnectionFailed { .. }
                | ConnectorError::ConnectionTimeout { .. }
                | ConnectorError::TargetUnavailable { .. }
                | ConnectorError::NetworkError { .. }
        )
    }

    /// Check if this error is permanent and a re-run won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectorError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            ConnectorError::ConnectionTimeout { .. } => "CONNECTION_TIMEOUT",
            ConnectorError::TargetUnavailable { .. } => "TARGET_UNAVAILABLE",
            ConnectorError::NetworkError { .. } => "NETWORK_ERROR",
            ConnectorError::AuthenticationFailed => "AUTH_FAILED",
            ConnectorError::AuthorizationFailed { .. } => "AUTHORIZATION_FAILED",
            ConnectorError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            ConnectorError::Disposed => "DISPOSED",
            ConnectorError::OperationFailed { .. } => "OPERATION_FAILED",
            ConnectorError::ObjectNotFound { .. } => "OBJECT_NOT_FOUND",
            ConnectorError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
        }
    }

    // Convenience constructors

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an operation failed error.
    pub fn operation_failed(message: impl Into<String>) -> Self {
        ConnectorError::OperationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source.
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::NetworkError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a malformed response error.
    pub fn malformed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectorError::MalformedResponse {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Failure of a directory query.
///
/// Always propagated: an empty result set means "nobody matches", a
/// `DirectoryError` means "we don't know", and the two must never be confused.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Connect or bind failed.
    #[error("directory unavailable: {0}")]
    Unavailable(#[source] ConnectorError),

    /// The filter was rejected by the client parser or the server.
    #[error("invalid directory query '{query}': {message}")]
    InvalidQuery { query: String, message: String },

    /// The search ran but did not complete successfully.
    #[error("directory search failed: {message}")]
    SearchFailed { message: String },
}

impl DirectoryError {
    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::Unavailable(_) => "DIRECTORY_UNAVAILABLE",
            DirectoryError::InvalidQuery { .. } => "DIRECTORY_INVALID_QUERY",
            DirectoryError::SearchFailed { .. } => "DIRECTORY_SEARCH_FAILED",
        }
    }
}

/// Failure to take a membership snapshot of a channel.
#[derive(Debug, Error)]
pub enum LookupError {
    /// No channel of the requested visibility matches the pattern.
    #[error("no {visibility} channel matches '{pattern}'; check the machine-readable name and the private flag")]
    ChannelNotFound {
        pattern: ChannelPattern,
        visibility: Visibility,
    },

    /// The channel exists but its member list could not be read completely.
    ///
    /// For private groups this usually means the service account is not a
    /// member of the group.
    #[error("could not read members of channel '{channel}': {reason}")]
    MembershipUnreadable { channel: String, reason: String },

    /// Any other chat-platform failure during the lookup.
    #[error(transparent)]
    Platform(#[from] ConnectorError),
}

impl LookupError {
    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            LookupError::ChannelNotFound { .. } => "CHANNEL_NOT_FOUND",
            LookupError::MembershipUnreadable { .. } => "MEMBERSHIP_UNREADABLE",
            LookupError::Platform(e) => e.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        let transient_errors = vec![
            ConnectorError::connection_failed("test"),
            ConnectorError::ConnectionTimeout { timeout_secs: 30 },
            ConnectorError::TargetUnavailable {
                message: "test".to_string(),
            },
            ConnectorError::network_with_source(
                "test",
                std::io::Error::new(std::io::ErrorKind::Other, "reset"),
            ),
        ];

        for err in transient_errors {
            assert!(
                err.is_transient(),
                "Expected {} to be transient",
                err.error_code()
            );
        }
    }

    #[test]
    fn test_permanent_errors() {
        let permanent_errors = vec![
            ConnectorError::AuthenticationFailed,
            ConnectorError::AuthorizationFailed {
                operation: "groups.kick".to_string(),
            },
            ConnectorError::InvalidConfiguration {
                message: "test".to_string(),
            },
            ConnectorError::malformed("users.list", "missing field `users`"),
            ConnectorError::Disposed,
        ];

        for err in permanent_errors {
            assert!(
                err.is_permanent(),
                "Expected {} to be permanent",
                err.error_code()
            );
        }
    }

    #[test]
    fn test_error_display() {
        let err = ConnectorError::ConnectionTimeout { timeout_secs: 30 };
        assert_eq!(err.to_string(), "connection timeout after 30 seconds");

        let err = ConnectorError::malformed("channels.members", "missing field `members`");
        assert_eq!(
            err.to_string(),
            "malformed response from channels.members: missing field `members`"
        );
    }

    #[test]
    fn test_lookup_error_codes() {
        let err = LookupError::ChannelNotFound {
            pattern: ChannelPattern::regex("devops"),
            visibility: Visibility::Private,
        };
        assert_eq!(err.error_code(), "CHANNEL_NOT_FOUND");
        assert!(err.to_string().contains("private"));

        let err = LookupError::from(ConnectorError::AuthenticationFailed);
        assert_eq!(err.error_code(), "AUTH_FAILED");
    }

    #[test]
    fn test_error_with_source() {
        let source_err = std::io::Error::new(std::io::ErrorKind::Other, "underlying error");
        let err = ConnectorError::connection_failed_with_source("failed", source_err);

        assert!(err.is_transient());
        assert!(std::error::Error::source(&err).is_some());
    }
}
