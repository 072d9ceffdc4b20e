//! The hub: one facade over the app registry.
//!
//! Exposes registry operations, the SDK version and one entry point per
//! service namespace carrying that namespace's statics and the default app's
//! module. A hub can be installed once as the process-wide instance.

use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};
use tracing::info;

use nb_core::config::AppsConfig;
use nb_core::constants::{namespaces, SDK_VERSION};
use nb_core::error::{NbError, NbResult};
use nb_core::options::AppOptions;
use nb_native::SharedBridge;

use crate::app::App;
use crate::module::ModuleRef;
use crate::namespace::NamespaceRegistry;
use crate::registry::AppRegistry;

static GLOBAL_HUB: OnceLock<AppHub> = OnceLock::new();

/// Facade over an [`AppRegistry`].
#[derive(Clone)]
pub struct AppHub {
    registry: AppRegistry,
    statics: Arc<Map<String, Value>>,
}

impl AppHub {
    pub fn new(registry: AppRegistry) -> Self {
        let statics = Arc::new(registry.namespaces().merged_statics());
        Self { registry, statics }
    }

    /// Bootstrap a registry with the built-in namespaces and wrap it.
    pub async fn bootstrap(bridge: SharedBridge, config: AppsConfig) -> NbResult<Self> {
        let registry = AppRegistry::bootstrap(bridge, NamespaceRegistry::builtin(), config).await?;
        Ok(Self::new(registry))
    }

    /// Make `hub` the process-wide instance. Only the first call succeeds.
    pub fn install(hub: AppHub) -> NbResult<&'static AppHub> {
        GLOBAL_HUB.set(hub).map_err(|_| NbError::AlreadyInstalled)?;
        info!("app hub installed (sdk {SDK_VERSION})");
        GLOBAL_HUB.get().ok_or(NbError::MissingCore)
    }

    /// The process-wide instance, if one was installed.
    pub fn global() -> NbResult<&'static AppHub> {
        GLOBAL_HUB.get().ok_or(NbError::MissingCore)
    }

    pub fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    pub fn initialize_app(&self, options: AppOptions, name: Option<&str>) -> NbResult<App> {
        self.registry.initialize_app(options, name)
    }

    /// Look up an app; `None` selects the default app.
    pub fn app(&self, name: Option<&str>) -> NbResult<App> {
        self.registry.app(name)
    }

    /// All registered apps, in registration order.
    pub fn apps(&self) -> Vec<App> {
        self.registry.apps()
    }

    pub fn sdk_version(&self) -> &'static str {
        SDK_VERSION
    }

    /// Statics of every namespace, keyed by namespace id.
    pub fn statics(&self) -> &Map<String, Value> {
        &self.statics
    }

    /// Process-wide entry point for one namespace.
    pub fn namespace(&self, id: &str) -> NbResult<NamespaceEntry> {
        let descriptor = self
            .registry
            .namespaces()
            .get(id)
            .ok_or_else(|| NbError::UnknownNamespace(id.to_string()))?;
        Ok(NamespaceEntry {
            id: descriptor.id().to_string(),
            statics: descriptor.statics().clone(),
            registry: self.registry.clone(),
        })
    }

    pub fn analytics(&self) -> NbResult<NamespaceEntry> {
        self.namespace(namespaces::ANALYTICS)
    }

    pub fn config(&self) -> NbResult<NamespaceEntry> {
        self.namespace(namespaces::CONFIG)
    }

    pub fn crashlytics(&self) -> NbResult<NamespaceEntry> {
        self.namespace(namespaces::CRASHLYTICS)
    }

    pub fn iid(&self) -> NbResult<NamespaceEntry> {
        self.namespace(namespaces::IID)
    }

    pub fn messaging(&self) -> NbResult<NamespaceEntry> {
        self.namespace(namespaces::MESSAGING)
    }

    pub fn notifications(&self) -> NbResult<NamespaceEntry> {
        self.namespace(namespaces::NOTIFICATIONS)
    }

    pub fn utils(&self) -> NbResult<NamespaceEntry> {
        self.namespace(namespaces::UTILS)
    }
}

/// App-independent entry point for one namespace.
#[derive(Clone)]
pub struct NamespaceEntry {
    id: String,
    statics: Map<String, Value>,
    registry: AppRegistry,
}

impl NamespaceEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn statics(&self) -> &Map<String, Value> {
        &self.statics
    }

    /// This namespace's module for the default app.
    pub fn module(&self) -> NbResult<ModuleRef> {
        self.registry.default_app()?.module(&self.id)
    }

    /// This namespace's module for a named app.
    pub fn module_for(&self, app_name: &str) -> NbResult<ModuleRef> {
        self.registry.app(Some(app_name))?.module(&self.id)
    }
}

impl std::fmt::Debug for NamespaceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceEntry")
            .field("id", &self.id)
            .field("statics", &self.statics)
            .finish()
    }
}
