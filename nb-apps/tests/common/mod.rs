//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use nb_apps::{AppHub, AppRegistry, NamespaceRegistry};
use nb_core::config::AppsConfig;
use nb_core::options::AppOptions;
use nb_native::{SharedBridge, SimulatedBridge};

/// Options that trigger the native handshake.
pub fn full_options() -> AppOptions {
    AppOptions::new("k", "d")
}

/// Options missing the API key: no handshake is ever dispatched.
pub fn partial_options() -> AppOptions {
    AppOptions {
        database_url: Some("d".into()),
        ..AppOptions::default()
    }
}

/// Registry over the given bridge with the built-in namespaces.
pub async fn registry_over(bridge: Arc<SimulatedBridge>) -> AppRegistry {
    AppRegistry::bootstrap(
        bridge as SharedBridge,
        NamespaceRegistry::builtin(),
        AppsConfig::default(),
    )
    .await
    .expect("failed to bootstrap registry")
}

/// Registry whose handshakes wait for `SimulatedBridge::complete`.
pub async fn manual_registry() -> (AppRegistry, Arc<SimulatedBridge>) {
    let bridge = Arc::new(SimulatedBridge::default().with_manual_completion());
    (registry_over(bridge.clone()).await, bridge)
}

/// Hub over a bridge that already has a native default app.
pub async fn hub_with_native_default() -> (AppHub, Arc<SimulatedBridge>) {
    let bridge = Arc::new(
        SimulatedBridge::default()
            .with_manual_completion()
            .with_existing_app(nb_core::DEFAULT_APP_NAME, full_options()),
    );
    let hub = AppHub::new(registry_over(bridge.clone()).await);
    (hub, bridge)
}

/// Wait until the bridge is holding a handshake for `name`.
pub async fn wait_until_held(bridge: &SimulatedBridge, name: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !bridge.is_held(name) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("handshake never reached the bridge");
}
