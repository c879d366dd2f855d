//! LDAP directory configuration
//!
//! Connection, bind and search-scope settings for the directory resolver.

use chansync_connector::config::{ConnectionSettings, ConnectorConfig, TlsConfig, REDACTED};
use chansync_connector::error::{ConnectorError, ConnectorResult};
use chansync_connector::types::ConnectorType;
use serde::{Deserialize, Serialize};

/// Configuration for the LDAP directory resolver.
#[derive(Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    /// LDAP server hostname or IP address.
    pub host: String,

    /// LDAP server port (389 for LDAP, 636 for LDAPS).
    #[serde(default = "default_ldap_port")]
    pub port: u16,

    /// Use SSL/TLS (LDAPS).
    #[serde(default)]
    pub use_ssl: bool,

    /// Use STARTTLS upgrade on plain LDAP connection.
    #[serde(default)]
    pub use_starttls: bool,

    /// Bind DN of the service account (e.g., "CN=LdapAccess,OU=FunctionalAccounts,DC=acme,DC=com").
    pub bind_dn: String,

    /// Bind password. Usually supplied through the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,

    /// Base DN every mapping query is evaluated under (e.g., "OU=Users,DC=acme,DC=com").
    pub search_base: String,

    /// Attribute holding the username shared with the chat platform.
    #[serde(default = "default_handle_attribute")]
    pub handle_attribute: String,

    /// Page size for the paged-results control.
    #[serde(default = "default_page_size")]
    pub page_size: i32,

    /// Connection settings (timeouts).
    #[serde(default)]
    pub connection: ConnectionSettings,

    /// TLS configuration.
    #[serde(default)]
    pub tls: TlsConfig,
}

impl std::fmt::Debug for LdapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("use_starttls", &self.use_starttls)
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &self.bind_password.as_ref().map(|_| REDACTED))
            .field("search_base", &self.search_base)
            .field("handle_attribute", &self.handle_attribute)
            .field("page_size", &self.page_size)
            .field("connection", &self.connection)
            .field("tls", &self.tls)
            .finish()
    }
}

fn default_ldap_port() -> u16 {
    389
}

fn default_handle_attribute() -> String {
    "sAMAccountName".to_string()
}

fn default_page_size() -> i32 {
    500
}

impl LdapConfig {
    /// Create a new LDAP config with required fields.
    pub fn new(
        host: impl Into<String>,
        search_base: impl Into<String>,
        bind_dn: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: default_ldap_port(),
            use_ssl: false,
            use_starttls: false,
            bind_dn: bind_dn.into(),
            bind_password: None,
            search_base: search_base.into(),
            handle_attribute: default_handle_attribute(),
            page_size: default_page_size(),
            connection: ConnectionSettings::default(),
            tls: TlsConfig::default(),
        }
    }

    /// Set bind password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.bind_password = Some(password.into());
        self
    }

    /// Enable SSL (LDAPS).
    #[must_use]
    pub fn with_ssl(mut self) -> Self {
        self.use_ssl = true;
        self.port = 636;
        self
    }

    /// Enable STARTTLS.
    #[must_use]
    pub fn with_starttls(mut self) -> Self {
        self.use_starttls = true;
        self
    }

    /// Get the LDAP URL.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

impl ConnectorConfig for LdapConfig {
    fn connector_type() -> ConnectorType {
        ConnectorType::Ldap
    }

    fn validate(&self) -> ConnectorResult<()> {
        if self.host.trim().is_empty() {
            return Err(ConnectorError::InvalidConfiguration {
                message: "ldap.host is required".to_string(),
            });
        }

        if self.search_base.trim().is_empty() {
            return Err(ConnectorError::InvalidConfiguration {
                message: "ldap.search_base is required".to_string(),
            });
        }

        if self.bind_dn.trim().is_empty() {
            return Err(ConnectorError::InvalidConfiguration {
                message: "ldap.bind_dn is required".to_string(),
            });
        }

        if self.handle_attribute.trim().is_empty() {
            return Err(ConnectorError::InvalidConfiguration {
                message: "ldap.handle_attribute must not be empty".to_string(),
            });
        }

        if self.use_ssl && self.use_starttls {
            return Err(ConnectorError::InvalidConfiguration {
                message: "cannot use both SSL and STARTTLS".to_string(),
            });
        }

        if self.page_size <= 0 {
            return Err(ConnectorError::InvalidConfiguration {
                message: format!("ldap.page_size must be positive, got {}", self.page_size),
            });
        }

        Ok(())
    }

    fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.bind_password.is_some() {
            config.bind_password = Some(REDACTED.to_string());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LdapConfig {
        LdapConfig::new(
            "ldap.acme.com",
            "OU=Users,DC=acme,DC=com",
            "CN=LdapAccess,OU=FunctionalAccounts,DC=acme,DC=com",
        )
    }

    #[test]
    fn test_ldap_config_new() {
        let config = config().with_password("secret");

        assert_eq!(config.host, "ldap.acme.com");
        assert_eq!(config.port, 389);
        assert_eq!(config.handle_attribute, "sAMAccountName");
        assert_eq!(config.page_size, 500);
        assert_eq!(config.bind_password, Some("secret".to_string()));
    }

    #[test]
    fn test_ldap_config_url() {
        let config = config();
        assert_eq!(config.url(), "ldap://ldap.acme.com:389");

        let ssl_config = config.with_ssl();
        assert_eq!(ssl_config.url(), "ldaps://ldap.acme.com:636");
    }

    #[test]
    fn test_ldap_config_validation() {
        assert!(config().validate().is_ok());

        let mut empty_host = config();
        empty_host.host = String::new();
        assert!(empty_host.validate().is_err());

        let mut empty_base = config();
        empty_base.search_base = " ".to_string();
        assert!(empty_base.validate().is_err());

        let both = config().with_ssl().with_starttls();
        assert!(both.validate().is_err());

        let mut zero_page = config();
        zero_page.page_size = 0;
        assert!(zero_page.validate().is_err());
    }

    #[test]
    fn test_ldap_config_redacted() {
        let config = config().with_password("super-secret");

        let redacted = config.redacted();
        assert_eq!(redacted.bind_password, Some(REDACTED.to_string()));
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[test]
    fn test_ldap_config_yaml_defaults() {
        let yaml = r#"
host: ldap.acme.com
bind_dn: CN=LdapAccess,DC=acme,DC=com
search_base: OU=Users,DC=acme,DC=com
"#;
        let parsed: LdapConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.port, 389);
        assert!(!parsed.use_ssl);
        assert!(parsed.bind_password.is_none());
        assert!(parsed.tls.verify_certificate);
    }
}
