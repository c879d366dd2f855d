//! chansync - keep chat channel membership in line with directory groups
//!
//! For every configured mapping the binary:
//! - Resolves an LDAP query to usernames
//! - Reads the current members of the target Rocket.Chat channel
//! - Invites missing users and kicks users no longer in the group
//!
//! Mappings are dry-run unless they set `apply: true`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chansync_cli::commands;
use chansync_cli::config::DEFAULT_CONFIG_PATH;
use chansync_cli::error::CliResult;
use chansync_cli::logging::{init_logging, LogFormat};
use chansync_cli::output::OutputFormat;

/// chansync - Directory to chat channel membership sync
#[derive(Parser)]
#[command(name = "chansync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        env = "CHANSYNC_CONFIG",
        default_value = DEFAULT_CONFIG_PATH,
        global = true
    )]
    config: PathBuf,

    /// Report format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(flatten)]
    sync: commands::sync::SyncArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and list the mappings
    CheckConfig(commands::check_config::CheckConfigArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    init_logging(&cli.log_level, cli.log_format)?;

    match cli.command {
        Some(Commands::CheckConfig(args)) => {
            commands::check_config::execute(&cli.config, args, cli.format).await
        }
        None => commands::sync::execute(&cli.config, cli.sync, cli.format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sync_flags() {
        let cli = Cli::try_parse_from([
            "chansync",
            "--config",
            "/etc/chansync.yaml",
            "--dry-run",
            "--mapping",
            "ops",
            "--mapping",
            "general",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/chansync.yaml"));
        assert!(cli.sync.dry_run);
        assert_eq!(cli.sync.mappings, vec!["ops", "general"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_check_config() {
        let cli = Cli::try_parse_from(["chansync", "check-config", "--log-format", "json"]).unwrap();

        assert!(matches!(
            cli.command,
            Some(Commands::CheckConfig(ref args)) if !args.connect
        ));
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_parse_check_config_connect() {
        let cli = Cli::try_parse_from(["chansync", "check-config", "--connect"]).unwrap();

        assert!(matches!(
            cli.command,
            Some(Commands::CheckConfig(ref args)) if args.connect
        ));
    }
}
