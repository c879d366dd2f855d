//! CLI error types and exit codes

use chansync_connector::error::ConnectorError;
use chansync_provisioning::SyncError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Every mapping completed without failures
/// - 1: Fatal error (configuration, account index, connection)
/// - 2: Run completed but at least one mapping failed or partially failed
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError),

    #[error("{failed} mapping(s) failed, {partial_failures} membership change(s) failed")]
    RunFailures { failed: u32, partial_failures: u32 },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::RunFailures { .. } => 2,
            CliError::Config(_)
            | CliError::Io(_)
            | CliError::Connector(_)
            | CliError::Sync(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => Some("Run 'chansync check-config' to validate the file."),
            CliError::Sync(SyncError::AccountIndex(ConnectorError::AuthenticationFailed))
            | CliError::Connector(ConnectorError::AuthenticationFailed) => Some(
                "Check the credentials, or set CHANSYNC_ROCKETCHAT_PASSWORD / CHANSYNC_ROCKETCHAT_TOKEN.",
            ),
            CliError::Sync(SyncError::UnknownMappings { .. }) => {
                Some("Run 'chansync check-config' to list the configured mapping labels.")
            }
            CliError::RunFailures { .. } => Some("See the log output for the cause of each failure."),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {}", e))
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Config(format!("YAML error: {}", e))
    }
}
