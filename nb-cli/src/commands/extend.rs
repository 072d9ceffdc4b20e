//! Extend command - attach custom properties to an app.

use console::style;
use nb_core::config::BridgeConfig;
use nb_core::error::NbResult;
use crate::OutputFormat;

/// Run the extend command.
pub async fn run(
    config: &BridgeConfig,
    name: Option<String>,
    props: String,
    format: OutputFormat,
) -> NbResult<()> {
    let hub = super::open_hub(config).await?;
    let app = hub.app(name.as_deref())?;

    let props: serde_json::Value = serde_json::from_str(&props)?;
    app.extend_app(props)?;

    let keys = app.extended_keys();
    match format {
        OutputFormat::Json => {
            let values: serde_json::Map<_, _> = keys
                .iter()
                .filter_map(|k| app.extended(k).map(|v| (k.clone(), v)))
                .collect();
            super::print_json(&serde_json::json!({
                "app": app.name(),
                "extended": values,
            }));
        }
        OutputFormat::Text => {
            println!("{} {}", style("Extended").green().bold(), app.name());
            for key in &keys {
                let value = app.extended(key).unwrap_or_default();
                println!("  {:<20} {}", key, value);
            }
        }
    }

    Ok(())
}
