//! Status command - show SDK version, namespaces and app readiness.

use console::style;
use nb_core::config::BridgeConfig;
use nb_core::error::NbResult;
use nb_core::platform;
use crate::OutputFormat;

/// Run the status command.
pub async fn run(config: &BridgeConfig, format: OutputFormat) -> NbResult<()> {
    let hub = super::open_hub(config).await?;
    let registry = hub.registry();
    let summaries = registry.summaries();
    let default_name = registry.default_app().ok().map(|a| a.name().to_string());

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "sdk_version": hub.sdk_version(),
                "platform": platform::os_name(),
                "native_available": config.native.available,
                "namespaces": registry.namespaces().ids(),
                "default_app": default_name,
                "apps": summaries,
            });
            super::print_json(&json);
        }
        OutputFormat::Text => {
            println!("{}", style("Bridge").bold().underlined());
            println!("  SDK version: {}", hub.sdk_version());
            println!("  Platform:    {}", platform::os_name());
            println!("  Namespaces:  {}", registry.namespaces().ids().join(", "));
            println!(
                "  Default app: {}",
                match &default_name {
                    Some(name) => style(name.as_str()).green().to_string(),
                    None => style("none").yellow().to_string(),
                }
            );

            println!();
            println!("{}", style("Apps").bold().underlined());
            if summaries.is_empty() {
                println!("  {}", style("no apps registered").dim());
            }
            for s in &summaries {
                println!("  {:<20} {}", s.name, super::readiness_label(&s.readiness));
            }
        }
    }

    Ok(())
}
