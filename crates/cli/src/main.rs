//! Math Tutor Agent CLI
//!
//! Main entry point for the mathtutor command-line tool.
//! Provides a REPL, an HTTP server, and knowledge base management.

mod commands;

use clap::{Parser, Subcommand};
use commands::{CleanCommand, IngestCommand, ReplCommand, ServeCommand, StatsCommand};
use mathtutor_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// Math Tutor Agent - retrieval-augmented math question answering
#[derive(Parser, Debug)]
#[command(name = "mathtutor")]
#[command(about = "Retrieval-augmented math tutoring agent", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "MATHTUTOR_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Ollama endpoint URL
    #[arg(short, long, global = true, env = "MATHTUTOR_ENDPOINT")]
    endpoint: Option<String>,

    /// Generation model identifier
    #[arg(short, long, global = true, env = "MATHTUTOR_MODEL")]
    model: Option<String>,

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
    /// Interactive question-answering loop
    Repl(ReplCommand),

    /// Run the HTTP server
    Serve(ServeCommand),

    /// Ingest math datasets into the knowledge base
    Ingest(IngestCommand),

    /// Show knowledge base statistics
    Stats(StatsCommand),

    /// Clear the knowledge base
    Clean(CleanCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load base configuration from environment, then apply CLI overrides
    let config = AppConfig::load()?;
    let config = config.with_overrides(
        cli.workspace,
        cli.endpoint,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Math Tutor Agent starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Endpoint: {}", config.endpoint);
    tracing::debug!("Model: {}", config.model);

    config.ensure_tutor_dir()?;

    let command_name = match &cli.command {
        Commands::Repl(_) => "repl",
        Commands::Serve(_) => "serve",
        Commands::Ingest(_) => "ingest",
        Commands::Stats(_) => "stats",
        Commands::Clean(_) => "clean",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Repl(cmd) => cmd.execute(&config).await,
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config),
        Commands::Clean(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result?;
    Ok(())
}
