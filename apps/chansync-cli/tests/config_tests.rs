//! Integration tests for configuration file loading
//!
//! Tests cover:
//! - Loading a complete file from disk
//! - Missing file
//! - Invalid YAML syntax
//! - Validation failures surfacing before any connection
//! - Per-mapping problems left to the run

use std::io::Write;

use chansync_cli::config::SyncConfig;
use chansync_cli::error::CliError;
use chansync_connector::types::{MatchMode, Visibility};
use chansync_connector_rocketchat::RocketChatAuth;
use tempfile::NamedTempFile;

const VALID: &str = r#"
ldap:
  host: dc01.acme.com
  use_ssl: true
  port: 636
  bind_dn: "CN=LdapAccess,OU=FunctionalAccounts,DC=acme,DC=com"
  bind_password: secret
  search_base: "OU=Users,DC=acme,DC=com"
  page_size: 200
rocketchat:
  base_url: https://chat.acme.com
  auth:
    method: token
    user_id: bot-id
    token: pat-value
  page_size: 50
mappings:
  - ldap_query: "(memberOf=CN=Dev,OU=Groups,DC=acme,DC=com)"
    channel: general
    apply: true
    additional_users: [admin]
  - ldap_query: "(memberOf=CN=Ops,OU=Groups,DC=acme,DC=com)"
    channel: team.ops
    match: exact
    private: true
"#;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// =========================================================================
// Loading
// =========================================================================

#[test]
fn test_load_valid_config() {
    let file = write_config(VALID);
    let config = SyncConfig::load(file.path()).unwrap();

    assert!(config.ldap.use_ssl);
    assert_eq!(config.ldap.port, 636);
    assert_eq!(config.ldap.page_size, 200);
    assert_eq!(config.rocketchat.page_size, 50);
    assert!(matches!(config.rocketchat.auth, RocketChatAuth::Token { .. }));

    assert_eq!(config.mappings.len(), 2);
    assert!(config.mappings[0].apply);
    assert_eq!(config.mappings[1].match_mode, MatchMode::Exact);
    assert_eq!(config.mappings[1].visibility(), Visibility::Private);
    assert_eq!(config.mappings[1].label(), "team.ops");
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = SyncConfig::load(&dir.path().join("absent.yaml")).unwrap_err();

    assert!(matches!(err, CliError::Config(_)));
    assert!(err.to_string().contains("File not found"));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_load_invalid_yaml() {
    let file = write_config("ldap:\n  host: [unclosed\n");
    let err = SyncConfig::load(file.path()).unwrap_err();

    assert!(err.to_string().contains("Invalid YAML"));
}

// =========================================================================
// Validation
// =========================================================================

#[test]
fn test_load_rejects_ssl_with_starttls() {
    let file = write_config(&VALID.replace("use_ssl: true", "use_ssl: true\n  use_starttls: true"));
    let err = SyncConfig::load(file.path()).unwrap_err();

    assert!(err.to_string().contains("STARTTLS"));
}

#[test]
fn test_load_rejects_non_http_base_url() {
    let file = write_config(&VALID.replace("https://chat.acme.com", "ftp://chat.acme.com"));
    let err = SyncConfig::load(file.path()).unwrap_err();

    assert!(err.to_string().contains("unsupported scheme"));
}

#[test]
fn test_load_keeps_config_with_one_broken_mapping() {
    let file = write_config(&VALID.replace(
        "channel: team.ops\n    match: exact",
        "name: ops\n    channel: \"\"",
    ));
    let config = SyncConfig::load(file.path()).unwrap();

    assert_eq!(config.mappings.len(), 2);
    assert!(config.mappings[0].validate().is_ok());
    assert_eq!(config.mappings[1].label(), "ops");
    let err = config.mappings[1].validate().unwrap_err();
    assert!(err.to_string().contains("channel pattern is empty"));
}

#[test]
fn test_load_accepts_platform_regex_syntax() {
    let file = write_config(&VALID.replace("channel: general", "channel: \"^gen(?!-archive)\""));
    let config = SyncConfig::load(file.path()).unwrap();

    assert_eq!(config.mappings[0].channel, "^gen(?!-archive)");
    assert!(config.mappings[0].validate().is_ok());
}

#[test]
fn test_load_keeps_config_with_empty_query() {
    let file = write_config(&VALID.replace(
        "\"(memberOf=CN=Ops,OU=Groups,DC=acme,DC=com)\"",
        "\"  \"",
    ));
    let config = SyncConfig::load(file.path()).unwrap();

    assert_eq!(config.mappings.len(), 2);
    assert!(config.mappings[0].validate().is_ok());
    let err = config.mappings[1].validate().unwrap_err();
    assert!(err.to_string().contains("ldap_query is empty"));
}

#[test]
fn test_load_rejects_duplicate_labels() {
    let file = write_config(&VALID.replace("channel: team.ops", "channel: general"));
    let err = SyncConfig::load(file.path()).unwrap_err();

    assert!(matches!(err, CliError::Config(_)));
    assert!(err.to_string().contains("duplicate mapping label 'general'"));
}
