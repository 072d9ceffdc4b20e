//! nbridge CLI - inspect and drive the named app registry from the terminal.
//!
//! Every invocation bootstraps a registry over the simulated native layer
//! described in the configuration file, so pre-existing native apps,
//! rejected API keys and handshake latency can all be exercised.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use nb_core::config::BridgeConfig;
use nb_core::error::NbResult;
use nb_core::logging;

/// nbridge - multi-app native bridge registry.
#[derive(Parser)]
#[command(
    name = "nbridge",
    version,
    about = "Named app registry over a native platform bridge",
    long_about = "Bootstraps the app registry against the configured native layer and\n\
                  runs one operation: list, initialize, extend or delete apps."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the SDK version, namespaces and registered apps.
    Status,
    /// List registered apps.
    Apps,
    /// List module namespaces and their statics.
    Namespaces,
    /// Initialize a new app.
    Init(commands::init::InitArgs),
    /// Add custom properties to an app.
    Extend {
        /// App name (defaults to the default app).
        #[arg(short, long)]
        name: Option<String>,
        /// JSON object of properties to add.
        props: String,
    },
    /// Delete an app.
    Delete {
        /// App name.
        name: String,
    },
}

#[tokio::main]
async fn main() -> NbResult<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BridgeConfig::load_from_file(path)?,
        None => BridgeConfig::load_default()?,
    };

    let log_level = if cli.verbose { "debug" } else { config.logging.level.as_str() };
    let log_dir = config
        .effective_log_dir()
        .unwrap_or_else(|_| PathBuf::from("logs"));
    let _guard = logging::init_logging(log_level, &log_dir, config.logging.json_output)?;

    info!("nbridge v{}", nb_core::SDK_VERSION);

    match cli.command {
        Commands::Status => commands::status::run(&config, cli.format).await,
        Commands::Apps => commands::apps::run(&config, cli.format).await,
        Commands::Namespaces => commands::namespaces::run(&config, cli.format).await,
        Commands::Init(args) => commands::init::run(&config, args, cli.format).await,
        Commands::Extend { name, props } => {
            commands::extend::run(&config, name, props, cli.format).await
        }
        Commands::Delete { name } => commands::delete::run(&config, name, cli.format).await,
    }
}
