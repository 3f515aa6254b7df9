//! ISA CLI
//!
//! Main entry point for the isa command-line tool.
//! Provides query analysis, hybrid search, and answer verification over
//! regulatory and standards sources.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{AnalyzeCommand, EvalCommand, SearchCommand, VerifyCommand};
use isa_core::{config::AppConfig, logging};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// ISA - evidence retrieval and answer verification
#[derive(Parser, Debug)]
#[command(name = "isa")]
#[command(about = "Hybrid evidence retrieval and answer verification", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "ISA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "ISA_CONFIG")]
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

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a query for ambiguity
    Analyze(AnalyzeCommand),

    /// Hybrid search over a corpus
    Search(SearchCommand),

    /// Verify an answer's claims against cited sources
    Verify(VerifyCommand),

    /// Evaluate many queries against a corpus
    Eval(EvalCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.log_json,
    );
    config.validate()?;

    // Initialize logging with final configuration
    logging::init_logging(&logging::LogOptions {
        level: config.log_level.as_deref(),
        no_color: config.no_color,
        json: config.log_json,
    })?;

    tracing::info!("ISA CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight work");
            trigger.cancel();
        }
    });

    let command_name = match &cli.command {
        Commands::Analyze(_) => "analyze",
        Commands::Search(_) => "search",
        Commands::Verify(_) => "verify",
        Commands::Eval(_) => "eval",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Analyze(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config, &cancel).await,
        Commands::Verify(cmd) => cmd.execute(&config).await,
        Commands::Eval(cmd) => cmd.execute(&config, &cancel).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result
}
