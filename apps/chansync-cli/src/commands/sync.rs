//! Run every configured mapping

use clap::Args;
use std::path::Path;
use tracing::{info, warn};

use chansync_connector::traits::Connector;
use chansync_connector_ldap::LdapDirectory;
use chansync_connector_rocketchat::RocketChatClient;
use chansync_provisioning::{MappingRunner, RunOptions};

use crate::config::SyncConfig;
use crate::error::{CliError, CliResult};
use crate::output::{print_report, OutputFormat};

/// Sync directory groups into chat channels
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Compute and report changes without applying any mapping
    #[arg(long)]
    pub dry_run: bool,

    /// Only run the mapping with this label (repeatable)
    #[arg(long = "mapping", value_name = "LABEL")]
    pub mappings: Vec<String>,
}

/// Execute a sync run
pub async fn execute(config_path: &Path, args: SyncArgs, format: OutputFormat) -> CliResult<()> {
    let SyncConfig {
        ldap,
        rocketchat,
        mappings,
    } = SyncConfig::load(config_path)?;

    info!(
        config = %config_path.display(),
        mappings = mappings.len(),
        "Configuration loaded"
    );

    let directory = LdapDirectory::new(ldap)?;
    let platform = RocketChatClient::new(rocketchat)?;

    let options = RunOptions {
        force_dry_run: args.dry_run,
        only: args.mappings,
    };

    let result = MappingRunner::new(&directory, &platform)
        .with_options(options)
        .run(&mappings)
        .await;

    dispose(&directory).await;
    dispose(&platform).await;

    let report = result?;
    print_report(&report, format)?;

    if report.has_failures() {
        return Err(CliError::RunFailures {
            failed: report.statistics.mappings_failed,
            partial_failures: report.statistics.partial_failures,
        });
    }

    Ok(())
}

/// Release a connector, logging instead of failing.
pub(crate) async fn dispose(connector: &dyn Connector) {
    if let Err(e) = connector.dispose().await {
        warn!(
            connector = connector.display_name(),
            error = %e,
            "Failed to release connection"
        );
    }
}
