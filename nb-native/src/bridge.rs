//! The native platform contract.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nb_core::error::NbResult;
use nb_core::options::AppOptions;

/// An app the native layer initialized before this process took control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeApp {
    pub name: String,
    pub options: AppOptions,
}

/// Operations the app registry needs from the platform layer.
///
/// Implementations must complete every `initialize_app` call exactly once,
/// either successfully or with an error carrying the native message.
#[async_trait]
pub trait NativeBridge: Send + Sync {
    /// Whether the native core module is present at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Run the initialization handshake for an app.
    async fn initialize_app(&self, name: &str, options: &AppOptions) -> NbResult<()>;

    /// Delete a natively initialized app.
    async fn delete_app(&self, name: &str) -> NbResult<()>;

    /// Apps already initialized outside this process's control.
    async fn list_existing_apps(&self) -> NbResult<Vec<NativeApp>>;
}

/// Shared, type-erased bridge handle.
pub type SharedBridge = Arc<dyn NativeBridge>;
