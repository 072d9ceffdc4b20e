//! Init command - initialize an app and optionally wait for readiness.

use clap::Args;
use console::style;
use std::time::Duration;
use tracing::info;

use nb_core::config::BridgeConfig;
use nb_core::error::NbResult;
use nb_core::AppOptions;
use crate::OutputFormat;

#[derive(Args)]
pub struct InitArgs {
    /// App name (omit for the default app).
    #[arg(short, long)]
    pub name: Option<String>,
    /// API key.
    #[arg(long)]
    pub api_key: Option<String>,
    /// Database URL.
    #[arg(long)]
    pub database_url: Option<String>,
    /// Project ID.
    #[arg(long)]
    pub project_id: Option<String>,
    /// App ID.
    #[arg(long)]
    pub app_id: Option<String>,
    /// Wait for the native handshake to settle.
    #[arg(short, long)]
    pub wait: bool,
    /// Wait timeout in milliseconds (overrides the configured value).
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Run the init command.
pub async fn run(config: &BridgeConfig, args: InitArgs, format: OutputFormat) -> NbResult<()> {
    let hub = super::open_hub(config).await?;

    let options = AppOptions {
        api_key: args.api_key,
        database_url: args.database_url,
        project_id: args.project_id,
        app_id: args.app_id,
        ..Default::default()
    };
    let app = hub.initialize_app(options, args.name.as_deref())?;
    info!("initialized app {}", app.name());

    let mut wait_error = None;
    if args.wait {
        let timeout = args
            .timeout_ms
            .map(Duration::from_millis)
            .or_else(|| config.apps.ready_timeout());
        let outcome = match timeout {
            Some(t) => app.on_ready_within(t).await,
            None => app.on_ready().await,
        };
        wait_error = outcome.err();
    }

    let summary = app.summary();
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_value(&summary)?;
            if let Some(e) = &wait_error {
                json["wait_error"] = serde_json::json!({ "code": e.code(), "message": e.to_string() });
            }
            super::print_json(&json);
        }
        OutputFormat::Text => {
            println!("{} {}", style("Initialized").green().bold(), summary.name);
            println!("  ID:         {}", summary.id);
            println!("  State:      {}", super::readiness_label(&summary.readiness));
            if !summary.fully_configured {
                println!(
                    "  {}",
                    style("options incomplete, native handshake deferred").yellow()
                );
            }
            if let Some(e) = &wait_error {
                println!("  {} {e}", style("Wait failed:").red());
            }
        }
    }

    match wait_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
