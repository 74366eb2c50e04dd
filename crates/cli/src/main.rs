//! clawtrail CLI — the main entry point.
//!
//! Commands:
//! - `format`   — Turn an agent session log into audit-channel summaries
//! - `forward`  — Mirror the agent's outgoing messages into the audit channel
//! - `init`     — Write a sample config file
//! - `status`   — Show configuration and dedup state

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "clawtrail",
    about = "clawtrail — audit trail for autonomous agents on Discord",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.clawtrail/config.toml)
    #[arg(short, long, global = true, env = "CLAWTRAIL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a JSONL session log and post a summary of every turn
    Format {
        /// Session label attached to log lines
        #[arg(short, long)]
        session: Option<String>,

        /// Read from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print summaries to stdout instead of posting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Poll watched channels and forward the agent's messages
    Forward {
        /// Run a single poll cycle and exit
        #[arg(long)]
        once: bool,

        /// Print forwards to stdout and leave the state file untouched
        #[arg(long)]
        dry_run: bool,
    },

    /// Write a sample config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Show configuration and dedup state
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries dry-run output
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Format {
            session,
            input,
            dry_run,
        } => commands::format::run(config_path, session, input, dry_run).await?,
        Commands::Forward { once, dry_run } => {
            commands::forward::run(config_path, once, dry_run).await?
        }
        Commands::Init { force } => commands::init::run(config_path, force)?,
        Commands::Status => commands::status::run(config_path)?,
    }

    Ok(())
}
