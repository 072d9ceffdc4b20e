//! Delete command - remove an app from the registry.

use console::style;
use nb_core::config::BridgeConfig;
use nb_core::error::NbResult;
use crate::OutputFormat;

/// Run the delete command.
pub async fn run(config: &BridgeConfig, name: String, format: OutputFormat) -> NbResult<()> {
    let hub = super::open_hub(config).await?;
    hub.registry().delete_app(&name).await?;

    let remaining: Vec<String> = hub.apps().iter().map(|a| a.name().to_string()).collect();
    match format {
        OutputFormat::Json => {
            super::print_json(&serde_json::json!({
                "deleted": name,
                "remaining": remaining,
            }));
        }
        OutputFormat::Text => {
            println!("{} {}", style("Deleted").green().bold(), name);
            println!("  Remaining: {}", remaining.join(", "));
        }
    }

    Ok(())
}
