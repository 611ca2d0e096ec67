//! Ragkit CLI
//!
//! Splits documents into overlapping chunks for retrieval pipelines and
//! manages named chunking profiles.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ProfileCommand, SplitCommand};
use ragkit_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Ragkit - document chunking for retrieval-augmented generation
#[derive(Parser, Debug)]
#[command(name = "ragkit")]
#[command(about = "Split documents into overlapping chunks", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "RAGKIT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "RAGKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split files or stdin into chunks
    Split(SplitCommand),

    /// Manage chunking profiles
    Profile(ProfileCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::debug!("Workspace: {:?}", config.workspace);

    let command_name = match &cli.command {
        Commands::Split(_) => "split",
        Commands::Profile(_) => "profile",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Split(cmd) => cmd.execute(&config).await,
        Commands::Profile(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
