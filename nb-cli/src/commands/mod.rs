//! CLI command implementations.

pub mod apps;
pub mod delete;
pub mod extend;
pub mod init;
pub mod namespaces;
pub mod status;

use std::sync::Arc;

use comfy_table::{Table, presets::UTF8_FULL, modifiers::UTF8_ROUND_CORNERS, ContentArrangement};
use console::style;

use nb_apps::{AppHub, AppSummary, ReadinessState};
use nb_core::config::BridgeConfig;
use nb_core::error::NbResult;
use nb_native::SimulatedBridge;

/// Bootstrap a hub over the configured simulated native layer.
pub async fn open_hub(config: &BridgeConfig) -> NbResult<AppHub> {
    let bridge = Arc::new(SimulatedBridge::new(config.native.clone()));
    AppHub::bootstrap(bridge, config.apps.clone()).await
}

/// Print a value as pretty JSON.
pub fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Colored readiness label.
pub fn readiness_label(state: &ReadinessState) -> String {
    match state {
        ReadinessState::Pending => style("pending").yellow().to_string(),
        ReadinessState::Ready => style("ready").green().to_string(),
        ReadinessState::Failed(e) => style(format!("failed: {e}")).red().to_string(),
    }
}

/// Render app summaries as a table.
pub fn apps_table(summaries: &[AppSummary]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "State", "Origin", "Modules", "Extended"]);
    for s in summaries {
        table.add_row(vec![
            s.name.clone(),
            readiness_label(&s.readiness),
            if s.native_originated { "native" } else { "explicit" }.to_string(),
            s.modules.join(", "),
            s.extended_keys.join(", "),
        ]);
    }
    table
}
