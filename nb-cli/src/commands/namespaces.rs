//! Namespaces command - list module namespaces with their statics.

use console::style;
use nb_core::config::BridgeConfig;
use nb_core::error::NbResult;
use crate::OutputFormat;

/// Run the namespaces command.
pub async fn run(config: &BridgeConfig, format: OutputFormat) -> NbResult<()> {
    let hub = super::open_hub(config).await?;
    let namespaces = hub.registry().namespaces();

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = namespaces
                .iter()
                .map(|d| serde_json::json!({ "id": d.id(), "statics": d.statics() }))
                .collect();
            super::print_json(&serde_json::json!({
                "namespaces": entries,
                "statics": hub.statics(),
            }));
        }
        OutputFormat::Text => {
            println!("{}", style("Namespaces").bold().underlined());
            for d in namespaces.iter() {
                let statics = serde_json::to_string(d.statics()).unwrap_or_default();
                println!("  {:<15} {}", style(d.id()).cyan(), style(statics).dim());
            }
        }
    }

    Ok(())
}
