//! Configuration file loading
//!
//! The whole run is described by one YAML file with `ldap`, `rocketchat`
//! and `mappings` sections. Secrets can be left out of the file and
//! supplied through the environment instead.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use chansync_connector::config::ConnectorConfig;
use chansync_connector_ldap::LdapConfig;
use chansync_connector_rocketchat::{RocketChatAuth, RocketChatConfig};
use chansync_provisioning::{validate_mappings, MappingDefinition, SyncError};

use crate::error::{CliError, CliResult};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "chansync.yaml";

/// Overrides `ldap.bind_password`.
pub const ENV_LDAP_BIND_PASSWORD: &str = "CHANSYNC_LDAP_BIND_PASSWORD";

/// Overrides the password of `rocketchat.auth` in password mode.
pub const ENV_ROCKETCHAT_PASSWORD: &str = "CHANSYNC_ROCKETCHAT_PASSWORD";

/// Overrides the token of `rocketchat.auth` in token mode.
pub const ENV_ROCKETCHAT_TOKEN: &str = "CHANSYNC_ROCKETCHAT_TOKEN";

/// Complete sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub ldap: LdapConfig,
    pub rocketchat: RocketChatConfig,
    #[serde(default)]
    pub mappings: Vec<MappingDefinition>,
}

impl SyncConfig {
    /// Read, merge environment secrets and validate.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::Config(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("Failed to read file {}: {}", path.display(), e)))?;

        let mut config = Self::from_yaml(&content)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parse without validating.
    pub fn from_yaml(content: &str) -> CliResult<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            let location = if let Some(loc) = e.location() {
                format!(" at line {}, column {}", loc.line(), loc.column())
            } else {
                String::new()
            };
            CliError::Config(format!("Invalid YAML{location}: {e}"))
        })
    }

    /// Fill secrets from `lookup`. A non-empty value wins over the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(password) = non_empty(ENV_LDAP_BIND_PASSWORD) {
            self.ldap.bind_password = Some(password);
        }

        match &mut self.rocketchat.auth {
            RocketChatAuth::Password { password, .. } => {
                if let Some(value) = non_empty(ENV_ROCKETCHAT_PASSWORD) {
                    *password = Some(value);
                }
            }
            RocketChatAuth::Token { token, .. } => {
                if let Some(value) = non_empty(ENV_ROCKETCHAT_TOKEN) {
                    *token = Some(value);
                }
            }
        }
    }

    /// Validate the connection sections and the mapping list before anything
    /// connects.
    ///
    /// Individual mappings are checked when they run, so a broken one shows
    /// up as a failed mapping in the report instead of stopping the process.
    pub fn validate(&self) -> CliResult<()> {
        self.ldap
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        self.rocketchat
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;

        validate_mappings(&self.mappings).map_err(|e| match e {
            SyncError::Configuration { message } => CliError::Config(message),
            other => CliError::Sync(other),
        })
    }

    /// Copy with every secret replaced, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            ldap: self.ldap.redacted(),
            rocketchat: self.rocketchat.redacted(),
            mappings: self.mappings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chansync_connector::config::REDACTED;
    use std::collections::HashMap;

    const CONFIG: &str = r#"
ldap:
  host: dc01.acme.com
  bind_dn: "CN=LdapAccess,OU=FunctionalAccounts,DC=acme,DC=com"
  bind_password: from-file
  search_base: "OU=Users,DC=acme,DC=com"
rocketchat:
  base_url: https://chat.acme.com
  auth:
    method: password
    username: sync-bot
mappings:
  - ldap_query: "(memberOf=CN=Dev,OU=Groups,DC=acme,DC=com)"
    channel: general
    additional_users: [Admin]
  - name: ops-private
    ldap_query: "(memberOf=CN=Ops,OU=Groups,DC=acme,DC=com)"
    channel: ops
    private: true
    match: exact
    apply: true
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_applies_defaults() {
        let config = SyncConfig::from_yaml(CONFIG).unwrap();

        assert_eq!(config.ldap.port, 389);
        assert_eq!(config.ldap.handle_attribute, "sAMAccountName");
        assert_eq!(config.rocketchat.page_size, 100);
        assert_eq!(config.mappings.len(), 2);

        let general = &config.mappings[0];
        assert_eq!(general.label(), "general");
        assert!(!general.apply);
        assert!(!general.private);
        assert_eq!(general.additional_users[0].as_str(), "admin");

        assert_eq!(config.mappings[1].label(), "ops-private");
        assert!(config.mappings[1].apply);
    }

    #[test]
    fn test_env_supplies_missing_password() {
        let mut config = SyncConfig::from_yaml(CONFIG).unwrap();
        assert!(config.validate().is_err());

        config.apply_env(env(&[(ENV_ROCKETCHAT_PASSWORD, "s3cret")]));
        assert!(config.validate().is_ok());
        assert_eq!(
            config.rocketchat.auth,
            RocketChatAuth::password("sync-bot", "s3cret")
        );
    }

    #[test]
    fn test_env_wins_over_file() {
        let mut config = SyncConfig::from_yaml(CONFIG).unwrap();
        config.apply_env(env(&[(ENV_LDAP_BIND_PASSWORD, "from-env")]));

        assert_eq!(config.ldap.bind_password.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let mut config = SyncConfig::from_yaml(CONFIG).unwrap();
        config.apply_env(env(&[(ENV_LDAP_BIND_PASSWORD, "")]));

        assert_eq!(config.ldap.bind_password.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_token_env_ignored_in_password_mode() {
        let mut config = SyncConfig::from_yaml(CONFIG).unwrap();
        config.apply_env(env(&[(ENV_ROCKETCHAT_TOKEN, "pat")]));

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let yaml = CONFIG.replace("name: ops-private", "name: general");
        let mut config = SyncConfig::from_yaml(&yaml).unwrap();
        config.apply_env(env(&[(ENV_ROCKETCHAT_PASSWORD, "s3cret")]));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate mapping label 'general'"));
    }

    #[test]
    fn test_no_mappings_rejected() {
        let yaml = CONFIG.split("mappings:").next().unwrap().to_string();
        let mut config = SyncConfig::from_yaml(&yaml).unwrap();
        config.apply_env(env(&[(ENV_ROCKETCHAT_PASSWORD, "s3cret")]));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no mappings configured"));
    }

    #[test]
    fn test_invalid_yaml_reports_location() {
        let err = SyncConfig::from_yaml("ldap: [unclosed").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("Invalid YAML"));
    }

    #[test]
    fn test_redacted_hides_secrets() {
        let mut config = SyncConfig::from_yaml(CONFIG).unwrap();
        config.apply_env(env(&[(ENV_ROCKETCHAT_PASSWORD, "s3cret")]));

        let redacted = config.redacted();
        assert_eq!(redacted.ldap.bind_password.as_deref(), Some(REDACTED));

        let yaml = serde_yaml::to_string(&redacted).unwrap();
        assert!(!yaml.contains("s3cret"));
        assert!(!yaml.contains("from-file"));
    }
}
