//! Apps command - list registered apps.

use console::style;
use nb_core::config::BridgeConfig;
use nb_core::error::NbResult;
use crate::OutputFormat;

/// Run the apps command.
pub async fn run(config: &BridgeConfig, format: OutputFormat) -> NbResult<()> {
    let hub = super::open_hub(config).await?;
    let summaries = hub.registry().summaries();

    match format {
        OutputFormat::Json => {
            super::print_json(&serde_json::to_value(&summaries)?);
        }
        OutputFormat::Text => {
            if summaries.is_empty() {
                println!("{}", style("No apps registered.").dim());
            } else {
                println!("{}", super::apps_table(&summaries));
                println!("{} app(s)", summaries.len());
            }
        }
    }

    Ok(())
}
