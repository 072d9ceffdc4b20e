//! App registry: the single source of truth for which named apps exist.
//!
//! The registry owns the ordered app list, the readiness channel, the native
//! bridge and the namespace set. It is created once per process (or per test)
//! and handed to whoever needs it; nothing here is ambient global state.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use nb_core::config::AppsConfig;
use nb_core::constants::DEFAULT_APP_NAME;
use nb_core::error::{NbError, NbResult};
use nb_core::options::AppOptions;
use nb_native::SharedBridge;

use crate::app::{App, AppOrigin, AppSummary};
use crate::namespace::NamespaceRegistry;
use crate::readiness::ReadinessChannel;

pub(crate) struct RegistryShared {
    /// Registered apps in registration order.
    apps: RwLock<Vec<App>>,
    pub(crate) channel: ReadinessChannel,
    pub(crate) bridge: SharedBridge,
    pub(crate) namespaces: Arc<NamespaceRegistry>,
    runtime: Handle,
    config: AppsConfig,
}

impl RegistryShared {
    fn read(&self) -> RwLockReadGuard<'_, Vec<App>> {
        self.apps.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<App>> {
        self.apps.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Remove exactly this instance; a newer app with the same name stays.
    pub(crate) fn remove_instance(&self, app: &App) -> bool {
        let mut apps = self.write();
        let before = apps.len();
        apps.retain(|a| !a.ptr_eq(app));
        let removed = apps.len() != before;
        if removed {
            debug!("removed app {} from registry ({} remaining)", app.name(), apps.len());
        }
        removed
    }
}

/// Registry of named apps.
#[derive(Clone)]
pub struct AppRegistry {
    shared: Arc<RegistryShared>,
}

impl AppRegistry {
    /// Create an empty registry.
    ///
    /// Must be called from within a tokio runtime; native handshakes are
    /// spawned onto it. Fails with `MissingCore` when the native layer is
    /// unavailable.
    pub fn new(
        bridge: SharedBridge,
        namespaces: NamespaceRegistry,
        config: AppsConfig,
    ) -> NbResult<Self> {
        if !bridge.is_available() {
            return Err(NbError::MissingCore);
        }
        let runtime = Handle::try_current().map_err(|e| {
            NbError::Internal(format!("app registry requires a tokio runtime: {e}"))
        })?;

        Ok(Self {
            shared: Arc::new(RegistryShared {
                apps: RwLock::new(Vec::new()),
                channel: ReadinessChannel::new(),
                bridge,
                namespaces: Arc::new(namespaces),
                runtime,
                config,
            }),
        })
    }

    /// Create a registry and register the apps the native layer already has.
    pub async fn bootstrap(
        bridge: SharedBridge,
        namespaces: NamespaceRegistry,
        config: AppsConfig,
    ) -> NbResult<Self> {
        let auto = config.auto_bootstrap_native;
        let registry = Self::new(bridge, namespaces, config)?;
        if auto {
            let count = registry.initialize_native_apps().await?;
            info!("registry bootstrapped with {count} native app(s)");
        }
        Ok(registry)
    }

    /// Register the apps initialized natively before this process started.
    ///
    /// Each one is ready immediately and marked native-originated. Names that
    /// are already registered are skipped. Returns how many were added.
    pub async fn initialize_native_apps(&self) -> NbResult<usize> {
        let existing = self.shared.bridge.list_existing_apps().await?;

        let mut apps = self.shared.write();
        let mut added = 0;
        for native in existing {
            if apps.iter().any(|a| a.name() == native.name) {
                warn!("native app {} is already registered, skipping", native.name);
                continue;
            }
            let app = App::new(&native.name, native.options, AppOrigin::Native, &self.shared);
            debug!("registered native app {}", app.name());
            apps.push(app);
            added += 1;
        }
        Ok(added)
    }

    /// Create and register a new app.
    ///
    /// `None` selects the default app name. The app is visible through
    /// [`app`](Self::app) and [`apps`](Self::apps) as soon as this returns,
    /// while its native handshake (if any) is still running. Apps without
    /// both a database URL and an API key never dispatch a handshake and stay
    /// pending.
    pub fn initialize_app(&self, options: AppOptions, name: Option<&str>) -> NbResult<App> {
        let name = match name {
            None => DEFAULT_APP_NAME,
            Some(n) if n.trim().is_empty() => {
                return Err(NbError::InvalidArgument(
                    "app name must be a non-empty string".into(),
                ));
            }
            Some(n) => n,
        };

        let app = {
            let mut apps = self.shared.write();
            if apps.iter().any(|a| a.name() == name) {
                return Err(NbError::DuplicateApp(name.to_string()));
            }
            let app = App::new(name, options, AppOrigin::Explicit, &self.shared);
            apps.push(app.clone());
            app
        };

        if app.options().is_fully_configured() {
            app.spawn_handshake(&self.shared.runtime);
        } else {
            debug!("app {name} lacks a database URL or API key; no native handshake");
        }
        info!("initialized app {name}");
        Ok(app)
    }

    /// Look up an app; `None` selects the default app.
    pub fn app(&self, name: Option<&str>) -> NbResult<App> {
        let name = name.unwrap_or(DEFAULT_APP_NAME);
        self.shared
            .read()
            .iter()
            .find(|a| a.name() == name)
            .cloned()
            .ok_or_else(|| NbError::AppNotFound(name.to_string()))
    }

    /// The default app.
    pub fn default_app(&self) -> NbResult<App> {
        self.app(None)
    }

    /// Snapshot of all registered apps, in registration order.
    pub fn apps(&self) -> Vec<App> {
        self.shared.read().clone()
    }

    /// Delete the named app.
    pub async fn delete_app(&self, name: &str) -> NbResult<()> {
        let app = self.app(Some(name))?;
        app.delete().await
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shared.read().iter().any(|a| a.name() == name)
    }

    pub fn len(&self) -> usize {
        self.shared.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.read().is_empty()
    }

    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.shared.namespaces
    }

    pub fn channel(&self) -> &ReadinessChannel {
        &self.shared.channel
    }

    pub fn config(&self) -> &AppsConfig {
        &self.shared.config
    }

    /// Diagnostic snapshot of every registered app.
    pub fn summaries(&self) -> Vec<AppSummary> {
        self.apps().iter().map(App::summary).collect()
    }
}
