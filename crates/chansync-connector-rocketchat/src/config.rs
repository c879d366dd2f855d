//! Rocket.Chat client configuration

use chansync_connector::config::{ConnectionSettings, ConnectorConfig, TlsConfig, REDACTED};
use chansync_connector::error::{ConnectorError, ConnectorResult};
use chansync_connector::types::ConnectorType;
use serde::{Deserialize, Serialize};

/// REST API prefix appended to the base URL.
const API_PREFIX: &str = "api/v1";

/// How the client authenticates against Rocket.Chat.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum RocketChatAuth {
    /// Log in with username and password; the session token is obtained
    /// on first use and released on dispose.
    Password {
        username: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },

    /// Personal access token issued to a user.
    Token {
        user_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
}

impl RocketChatAuth {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        RocketChatAuth::Password {
            username: username.into(),
            password: Some(password.into()),
        }
    }

    pub fn token(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        RocketChatAuth::Token {
            user_id: user_id.into(),
            token: Some(token.into()),
        }
    }

    /// Return a copy with the secret replaced.
    #[must_use]
    pub fn redacted(&self) -> Self {
        match self {
            RocketChatAuth::Password { username, password } => RocketChatAuth::Password {
                username: username.clone(),
                password: password.as_ref().map(|_| REDACTED.to_string()),
            },
            RocketChatAuth::Token { user_id, token } => RocketChatAuth::Token {
                user_id: user_id.clone(),
                token: token.as_ref().map(|_| REDACTED.to_string()),
            },
        }
    }
}

impl std::fmt::Debug for RocketChatAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.redacted() {
            RocketChatAuth::Password { username, password } => f
                .debug_struct("Password")
                .field("username", &username)
                .field("password", &password)
                .finish(),
            RocketChatAuth::Token { user_id, token } => f
                .debug_struct("Token")
                .field("user_id", &user_id)
                .field("token", &token)
                .finish(),
        }
    }
}

/// Configuration for the Rocket.Chat client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocketChatConfig {
    /// Server URL (e.g., "https://chat.acme.com").
    pub base_url: String,

    /// Authentication.
    pub auth: RocketChatAuth,

    /// Items requested per page for listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Connection settings (timeouts).
    #[serde(default)]
    pub connection: ConnectionSettings,

    /// TLS configuration.
    #[serde(default)]
    pub tls: TlsConfig,
}

fn default_page_size() -> u32 {
    100
}

impl RocketChatConfig {
    /// Create a new config with required fields.
    pub fn new(base_url: impl Into<String>, auth: RocketChatAuth) -> Self {
        Self {
            base_url: base_url.into(),
            auth,
            page_size: default_page_size(),
            connection: ConnectionSettings::default(),
            tls: TlsConfig::default(),
        }
    }

    /// Set page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Build the full URL for an API endpoint (e.g., "users.list").
    pub fn api_url(&self, endpoint: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        format!("{base}/{API_PREFIX}/{endpoint}")
    }
}

impl ConnectorConfig for RocketChatConfig {
    fn connector_type() -> ConnectorType {
        ConnectorType::RocketChat
    }

    fn validate(&self) -> ConnectorResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConnectorError::InvalidConfiguration {
                message: "rocketchat.base_url is required".to_string(),
            });
        }

        let url =
            url::Url::parse(&self.base_url).map_err(|e| ConnectorError::InvalidConfiguration {
                message: format!("invalid rocketchat.base_url: {e}"),
            })?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConnectorError::InvalidConfiguration {
                message: format!("unsupported scheme in rocketchat.base_url: {}", url.scheme()),
            });
        }

        match &self.auth {
            RocketChatAuth::Password { username, password } => {
                if username.trim().is_empty() {
                    return Err(ConnectorError::InvalidConfiguration {
                        message: "rocketchat.auth.username is required".to_string(),
                    });
                }
                if password.as_deref().map_or(true, str::is_empty) {
                    return Err(ConnectorError::InvalidConfiguration {
                        message: "rocketchat.auth.password is required (or set CHANSYNC_ROCKETCHAT_PASSWORD)"
                            .to_string(),
                    });
                }
            }
            RocketChatAuth::Token { user_id, token } => {
                if user_id.trim().is_empty() {
                    return Err(ConnectorError::InvalidConfiguration {
                        message: "rocketchat.auth.user_id is required".to_string(),
                    });
                }
                if token.as_deref().map_or(true, str::is_empty) {
                    return Err(ConnectorError::InvalidConfiguration {
                        message: "rocketchat.auth.token is required (or set CHANSYNC_ROCKETCHAT_TOKEN)"
                            .to_string(),
                    });
                }
            }
        }

        if self.page_size == 0 {
            return Err(ConnectorError::InvalidConfiguration {
                message: "rocketchat.page_size must be positive".to_string(),
            });
        }

        Ok(())
    }

    fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.auth = config.auth.redacted();
        config
    }
}
