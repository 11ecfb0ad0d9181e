//! IdSync CLI - keeps a local identity replica in sync with a SCIM directory
//!
//! Provides commands for:
//! - Running the reconciliation daemon
//! - Running a single reconciliation pass
//! - Creating, updating and deleting users, groups and memberships locally,
//!   with every change pushed to the directory
//! - Inspecting and validating configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use idsync_core::config::Config;

mod commands;
mod context;
mod output;

use commands::{
    config::ConfigCommand, daemon::DaemonCommand, group::GroupCommand, member::MemberCommand,
    sync::SyncCommand, user::UserCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "idsync",
    version,
    about = "Two-way sync between a local identity store and a SCIM directory"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run reconciliation passes on a fixed interval until stopped
    Daemon(DaemonCommand),
    /// Run one reconciliation pass and print its summary
    Sync(SyncCommand),
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),
    /// Manage groups
    #[command(subcommand)]
    Group(GroupCommand),
    /// Manage group memberships
    #[command(subcommand)]
    Member(MemberCommand),
    /// View and check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Log filter from `-v` count, falling back to the configured level
fn log_filter(verbose: u8, configured: &str) -> &str {
    match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = log_filter(cli.verbose, &config.logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so stdout stays parseable
    if cli.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    init_tracing(&cli, &config);
    tracing::debug!(config_path = %config_path.display(), "Loaded configuration");

    let format = OutputFormat::from_json_flag(cli.json);

    match cli.command {
        Commands::Daemon(cmd) => cmd.execute(config, format).await,
        Commands::Sync(cmd) => cmd.execute(config, format).await,
        Commands::User(cmd) => cmd.execute(config, format).await,
        Commands::Group(cmd) => cmd.execute(config, format).await,
        Commands::Member(cmd) => cmd.execute(config, format).await,
        Commands::Config(cmd) => cmd.execute(&config_path, format),
    }
}
