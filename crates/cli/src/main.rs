//! Quorum CLI
//!
//! Main entry point for the quorum command-line tool. Manages
//! domain-specialized knowledge agents, their document collections, and
//! the routed question-answering pipeline.

mod commands;
mod runtime;

use clap::{Parser, Subcommand};
use commands::{AgentCommand, ChatCommand, DocCommand, StatsCommand};
use quorum_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Quorum - routed question answering over per-agent document collections
#[derive(Parser, Debug)]
#[command(name = "quorum")]
#[command(about = "Routed question answering over per-agent document collections", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "QUORUM_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "QUORUM_CONFIG")]
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

    /// Generation provider (ollama, openai)
    #[arg(short, long, global = true, env = "QUORUM_PROVIDER")]
    provider: Option<String>,

    /// Generation model identifier
    #[arg(short, long, global = true, env = "QUORUM_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage knowledge agents
    Agent(AgentCommand),

    /// Manage an agent's documents
    Doc(DocCommand),

    /// Ask a question through the routed pipeline
    Chat(ChatCommand),

    /// Show registry and store statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Quorum CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;
    config.ensure_quorum_dir()?;

    let command_name = match &cli.command {
        Commands::Agent(_) => "agent",
        Commands::Doc(_) => "doc",
        Commands::Chat(_) => "chat",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Agent(cmd) => cmd.execute(&config).await,
        Commands::Doc(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
