//! Validate the configuration, optionally checking both connections

use clap::Args;
use std::path::Path;
use tracing::info;

use chansync_connector::traits::Connector;
use chansync_connector::types::MatchMode;
use chansync_connector_ldap::LdapDirectory;
use chansync_connector_rocketchat::RocketChatClient;
use chansync_provisioning::MappingDefinition;

use crate::commands::sync::dispose;
use crate::config::SyncConfig;
use crate::error::CliResult;
use crate::output::{print_header, print_key_value, print_success, print_warning, OutputFormat};

/// Validate the configuration file
#[derive(Args, Debug, Default)]
pub struct CheckConfigArgs {
    /// Also bind to the directory and authenticate against the chat platform
    #[arg(long)]
    pub connect: bool,
}

/// One line of the mapping overview.
pub fn describe_mapping(mapping: &MappingDefinition) -> String {
    let mode = if mapping.apply { "apply" } else { "dry run" };
    format!(
        "{} -> {} ({}, {} match, {}, {} static user(s))",
        mapping.label(),
        mapping.channel,
        mapping.visibility(),
        match mapping.match_mode {
            MatchMode::Regex => "regex",
            MatchMode::Exact => "exact",
        },
        mode,
        mapping.additional_users.len(),
    )
}

/// Execute the check-config command
pub async fn execute(
    config_path: &Path,
    args: CheckConfigArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let config = SyncConfig::load(config_path)?;

    if args.connect {
        check_connections(&config).await?;
    }

    let config = config.redacted();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    print_header("chansync configuration");
    print_key_value("File", &config_path.display().to_string());
    print_key_value("LDAP", &config.ldap.url());
    print_key_value("Search base", &config.ldap.search_base);
    print_key_value("Rocket.Chat", &config.rocketchat.base_url);
    println!();
    println!("{}", serde_yaml::to_string(&config)?);

    println!("Mappings:");
    for mapping in &config.mappings {
        println!("  {}", describe_mapping(mapping));
    }
    println!();

    for mapping in &config.mappings {
        if let Err(e) = mapping.validate() {
            print_warning(&format!("{e} (this mapping will fail when run)"));
        }
    }

    if !config.ldap.tls.verify_certificate || !config.rocketchat.tls.verify_certificate {
        print_warning("TLS certificate verification is disabled");
    }

    print_success(&format!(
        "Configuration is valid ({} mapping(s))",
        config.mappings.len()
    ));
    Ok(())
}

async fn check_connections(config: &SyncConfig) -> CliResult<()> {
    let directory = LdapDirectory::new(config.ldap.clone())?;
    let platform = RocketChatClient::new(config.rocketchat.clone())?;

    let mut result = test_connection(&directory).await;
    if result.is_ok() {
        result = test_connection(&platform).await;
    }

    dispose(&directory).await;
    dispose(&platform).await;
    result
}

async fn test_connection(connector: &dyn Connector) -> CliResult<()> {
    connector.test_connection().await?;
    info!(connector = connector.display_name(), "Connection check passed");
    Ok(())
}
