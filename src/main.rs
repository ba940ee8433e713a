//! Model Sliding - keyword-routed multi-model AI chat
//!
//! Picks the model and assistant persona best suited to each prompt and
//! streams the reply into the terminal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

mod ai;
mod cli;
mod config;
mod core;
mod ui;

/// Model Sliding - route every prompt to the right model
#[derive(Parser)]
#[command(name = "slide")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Keyword-routed multi-model AI chat", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session
    Chat {
        /// Initial prompt
        prompt: Option<String>,
    },

    /// Show which model and persona a prompt routes to
    Route {
        /// The prompt to route
        prompt: String,
    },

    /// Show the routing rules table
    Models,

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize configuration file
        #[arg(long)]
        init: bool,
    },

    /// Show version and system info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with streamed replies
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config(cli.config.as_deref())?;

    info!("Model Sliding v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Chat { prompt }) => {
            cli::chat::run(config, prompt).await?;
        }
        Some(Commands::Route { prompt }) => {
            cli::route::run(&config, &prompt)?;
        }
        Some(Commands::Models) => {
            cli::route::models(&config)?;
        }
        Some(Commands::Config { show, init }) => {
            if init {
                config::init_config(cli.config.as_deref())?;
            } else if show {
                config::show_config(&config)?;
            }
        }
        Some(Commands::Info) => {
            cli::info::run(&config)?;
        }
        None => {
            // Default: Start interactive chat
            cli::chat::run(config, None).await?;
        }
    }

    Ok(())
}
