//! App instances.
//!
//! An `App` is a cheap handle to one named, configured app: its options,
//! extension table, lazily built modules and native readiness. Clones share
//! the same instance.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use nb_core::constants::{namespaces, DEFAULT_APP_NAME};
use nb_core::error::{NbError, NbResult};
use nb_core::options::AppOptions;
use nb_native::SharedBridge;

use crate::extension::{ExtensionTable, INTRINSIC_PROPERTIES};
use crate::module::{Module, ModuleCache, ModuleRef};
use crate::namespace::NamespaceRegistry;
use crate::readiness::{ReadinessCell, ReadinessChannel, ReadinessState};
use crate::registry::RegistryShared;

/// How an app came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AppOrigin {
    /// Initialized by the native layer before this process took control.
    Native,
    /// Created through `initialize_app`.
    Explicit,
}

// Lifecycle of an instance with respect to deletion.
const LIVE: u8 = 0;
const DELETING: u8 = 1;
const DELETED: u8 = 2;

pub(crate) struct AppInner {
    id: Uuid,
    name: String,
    options: AppOptions,
    origin: AppOrigin,
    created_at: DateTime<Utc>,
    readiness: ReadinessCell,
    extensions: Mutex<ExtensionTable>,
    modules: ModuleCache,
    lifecycle: AtomicU8,
    namespaces: Arc<NamespaceRegistry>,
    channel: ReadinessChannel,
    bridge: SharedBridge,
    registry: Weak<RegistryShared>,
}

/// Handle to one named app.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

/// Serializable snapshot of an app for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct AppSummary {
    pub name: String,
    pub id: Uuid,
    pub readiness: ReadinessState,
    pub native_originated: bool,
    pub fully_configured: bool,
    pub modules: Vec<String>,
    pub extended_keys: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl App {
    pub(crate) fn new(
        name: &str,
        options: AppOptions,
        origin: AppOrigin,
        registry: &Arc<RegistryShared>,
    ) -> Self {
        let readiness = match origin {
            AppOrigin::Native => ReadinessCell::ready(),
            AppOrigin::Explicit => ReadinessCell::pending(),
        };
        Self {
            inner: Arc::new(AppInner {
                id: Uuid::new_v4(),
                name: name.to_string(),
                options,
                origin,
                created_at: Utc::now(),
                readiness,
                extensions: Mutex::new(ExtensionTable::default()),
                modules: ModuleCache::default(),
                lifecycle: AtomicU8::new(LIVE),
                namespaces: registry.namespaces.clone(),
                channel: registry.channel.clone(),
                bridge: registry.bridge.clone(),
                registry: Arc::downgrade(registry),
            }),
        }
    }

    /// Unique identity of this instance; a re-created app with the same name
    /// gets a new one.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// A copy of the options this app was initialized with.
    pub fn options(&self) -> AppOptions {
        self.inner.options.clone()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    pub fn state(&self) -> ReadinessState {
        self.inner.readiness.state()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ReadinessState::Ready
    }

    pub fn is_native_originated(&self) -> bool {
        self.inner.origin == AppOrigin::Native
    }

    pub fn is_deleted(&self) -> bool {
        self.inner.lifecycle.load(Ordering::SeqCst) == DELETED
    }

    /// Whether this instance shares identity with `other`.
    pub fn ptr_eq(&self, other: &App) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // -- Native handshake --

    /// Run the native handshake in the background.
    pub(crate) fn spawn_handshake(&self, runtime: &Handle) {
        let app = self.clone();
        debug!("dispatching native handshake for app {}", self.name());
        runtime.spawn(async move {
            let result = app
                .inner
                .bridge
                .initialize_app(&app.inner.name, &app.inner.options)
                .await;
            app.complete_handshake(result);
        });
    }

    /// Record the handshake result, then tell current subscribers.
    pub(crate) fn complete_handshake(&self, result: NbResult<()>) {
        let error = result.err().map(|e| match e {
            NbError::Native(message) | NbError::NativeInitialization(message) => message,
            other => other.to_string(),
        });

        if !self.inner.readiness.resolve(error.clone()) {
            warn!("ignoring repeated handshake result for app {}", self.name());
            return;
        }

        match &error {
            None => info!("app {} is ready", self.name()),
            Some(e) => warn!("app {} failed native initialization: {e}", self.name()),
        }
        self.inner.channel.emit_ready(self.name(), error);
    }

    /// Wait until the native handshake has completed.
    ///
    /// Resolves with this app once ready, or fails with
    /// `NativeInitialization` carrying the native message. Any number of
    /// calls, before or after completion, observe the same outcome. Apps that
    /// never dispatched a handshake stay pending; see [`App::on_ready_within`].
    pub async fn on_ready(&self) -> NbResult<App> {
        loop {
            if let Some(outcome) = self.terminal_outcome() {
                return outcome;
            }

            // Subscribe before the second look so a completion racing with
            // this call is seen either in the cache or on the channel.
            let waiter = self.inner.channel.await_ready(self.name());
            if let Some(outcome) = self.terminal_outcome() {
                return outcome;
            }

            if waiter.wait().await.is_none() {
                return Err(NbError::Internal(format!(
                    "readiness channel closed while waiting for app {}",
                    self.name()
                )));
            }
            // Events are keyed by name only; the cache decides.
        }
    }

    /// [`App::on_ready`] bounded by `timeout`.
    pub async fn on_ready_within(&self, timeout: Duration) -> NbResult<App> {
        tokio::time::timeout(timeout, self.on_ready())
            .await
            .map_err(|_| {
                NbError::Timeout(format!(
                    "app '{}' was not ready after {}ms",
                    self.name(),
                    timeout.as_millis()
                ))
            })?
    }

    fn terminal_outcome(&self) -> Option<NbResult<App>> {
        match self.state() {
            ReadinessState::Pending => None,
            ReadinessState::Ready => Some(Ok(self.clone())),
            ReadinessState::Failed(message) => Some(Err(NbError::NativeInitialization(message))),
        }
    }

    // -- Modules --

    /// The module of `namespace` for this app, built on first access.
    pub fn module(&self, namespace: &str) -> NbResult<ModuleRef> {
        if self.is_deleted() {
            return Err(NbError::AppDeleted(self.name().to_string()));
        }
        let descriptor = self
            .inner
            .namespaces
            .get(namespace)
            .ok_or_else(|| NbError::UnknownNamespace(namespace.to_string()))?;
        let module = self.inner.modules.get_or_create(self, descriptor);

        // A delete that finished meanwhile may have cleared the cache before
        // this slot was filled.
        if self.is_deleted() {
            self.inner.modules.clear();
            return Err(NbError::AppDeleted(self.name().to_string()));
        }
        Ok(module)
    }

    /// Typed access to a module.
    pub fn module_as<T: Module>(&self, namespace: &str) -> NbResult<Arc<T>> {
        self.module(namespace)?
            .into_any()
            .downcast::<T>()
            .map_err(|_| {
                NbError::InvalidArgument(format!(
                    "module '{namespace}' is not a {}",
                    std::any::type_name::<T>()
                ))
            })
    }

    /// A reusable accessor bound to this app and `namespace`.
    pub fn accessor(&self, namespace: &str) -> NbResult<ModuleAccessor> {
        if !self.inner.namespaces.contains(namespace) {
            return Err(NbError::UnknownNamespace(namespace.to_string()));
        }
        Ok(ModuleAccessor {
            app: self.clone(),
            namespace: namespace.to_string(),
        })
    }

    pub fn analytics(&self) -> NbResult<ModuleRef> {
        self.module(namespaces::ANALYTICS)
    }

    pub fn config(&self) -> NbResult<ModuleRef> {
        self.module(namespaces::CONFIG)
    }

    pub fn crashlytics(&self) -> NbResult<ModuleRef> {
        self.module(namespaces::CRASHLYTICS)
    }

    pub fn iid(&self) -> NbResult<ModuleRef> {
        self.module(namespaces::IID)
    }

    pub fn messaging(&self) -> NbResult<ModuleRef> {
        self.module(namespaces::MESSAGING)
    }

    pub fn notifications(&self) -> NbResult<ModuleRef> {
        self.module(namespaces::NOTIFICATIONS)
    }

    pub fn utils(&self) -> NbResult<ModuleRef> {
        self.module(namespaces::UTILS)
    }

    // -- Extension --

    /// Add custom properties to this app.
    ///
    /// `props` must be a JSON object. Keys naming a built-in property or a
    /// namespace accessor are refused unless an earlier `extend_app` set
    /// them. A refused call changes nothing.
    pub fn extend_app(&self, props: Value) -> NbResult<()> {
        let namespaces = &self.inner.namespaces;
        let keys = self.extensions().merge(props, |key| {
            INTRINSIC_PROPERTIES.contains(&key) || namespaces.contains(key)
        })?;
        debug!("extended app {} with {keys:?}", self.name());
        Ok(())
    }

    /// A property previously set with [`App::extend_app`].
    pub fn extended(&self, key: &str) -> Option<Value> {
        self.extensions().get(key).cloned()
    }

    pub fn extended_keys(&self) -> Vec<String> {
        self.extensions().keys()
    }

    fn extensions(&self) -> MutexGuard<'_, ExtensionTable> {
        self.inner.extensions.lock().unwrap_or_else(|e| e.into_inner())
    }

    // -- Deletion --

    fn is_protected(&self) -> bool {
        self.name() == DEFAULT_APP_NAME && self.is_native_originated()
    }

    /// Delete this app natively and remove it from its registry.
    ///
    /// The natively initialized default app cannot be deleted. Only one
    /// delete per instance reaches the native layer; an overlapping call
    /// fails with `AppDeleted`. If the native layer fails, the app stays
    /// registered and can be deleted again.
    pub async fn delete(&self) -> NbResult<()> {
        if self.is_protected() {
            return Err(NbError::ProtectedDefaultApp);
        }
        if self
            .inner
            .lifecycle
            .compare_exchange(LIVE, DELETING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(NbError::AppDeleted(self.name().to_string()));
        }

        info!("deleting app {}", self.name());
        if let Err(e) = self.inner.bridge.delete_app(self.name()).await {
            error!("native delete of app {} failed: {e}", self.name());
            self.inner.lifecycle.store(LIVE, Ordering::SeqCst);
            return Err(e);
        }

        if let Some(registry) = self.inner.registry.upgrade() {
            registry.remove_instance(self);
        }
        self.inner.lifecycle.store(DELETED, Ordering::SeqCst);
        self.inner.modules.clear();
        info!("app {} deleted", self.name());
        Ok(())
    }

    pub fn summary(&self) -> AppSummary {
        AppSummary {
            name: self.name().to_string(),
            id: self.id(),
            readiness: self.state(),
            native_originated: self.is_native_originated(),
            fully_configured: self.inner.options.is_fully_configured(),
            modules: self.inner.modules.constructed(),
            extended_keys: self.extended_keys(),
            created_at: self.created_at(),
            resolved_at: self.inner.readiness.resolved_at(),
        }
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.inner.name)
            .field("id", &self.inner.id)
            .field("origin", &self.inner.origin)
            .field("state", &self.state())
            .finish()
    }
}

impl PartialEq for App {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for App {}

/// Zero-argument accessor for one app's module in one namespace.
#[derive(Clone, Debug)]
pub struct ModuleAccessor {
    app: App,
    namespace: String,
}

impl ModuleAccessor {
    pub fn get(&self) -> NbResult<ModuleRef> {
        self.app.module(&self.namespace)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn app(&self) -> &App {
        &self.app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use serde_json::json;

    use nb_native::SimulatedBridge;

    use crate::module::ServiceModule;
    use crate::namespace::NamespaceDescriptor;
    use crate::registry::AppRegistry;

    fn registry_with(namespaces: NamespaceRegistry) -> AppRegistry {
        AppRegistry::new(
            Arc::new(SimulatedBridge::default()),
            namespaces,
            Default::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_display_is_name() {
        let registry = registry_with(NamespaceRegistry::builtin());
        let app = registry.initialize_app(AppOptions::default(), Some("secondary")).unwrap();
        assert_eq!(app.to_string(), "secondary");
        assert_eq!(format!("{app}"), "secondary");
    }

    #[tokio::test]
    async fn test_options_are_copies() {
        let registry = registry_with(NamespaceRegistry::builtin());
        let app = registry
            .initialize_app(AppOptions::new("k", "d"), Some("copy"))
            .unwrap();

        let mut opts = app.options();
        opts.api_key = Some("changed".into());
        assert_eq!(app.options().api_key.as_deref(), Some("k"));
    }

    #[tokio::test]
    async fn test_module_built_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut namespaces = NamespaceRegistry::new();
        let counter = calls.clone();
        namespaces
            .register(NamespaceDescriptor::new("counted", move |app: &App| -> ModuleRef {
                counter.fetch_add(1, Ordering::SeqCst);
                Arc::new(ServiceModule::new(app, "counted", "NbCounted"))
            }))
            .unwrap();

        let registry = registry_with(namespaces);
        let app = registry.initialize_app(AppOptions::default(), None).unwrap();

        let accessor = app.accessor("counted").unwrap();
        let first = accessor.get().unwrap();
        let second = accessor.get().unwrap();
        let direct = app.module("counted").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &direct));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.app_name(), DEFAULT_APP_NAME);
    }

    #[tokio::test]
    async fn test_modules_are_per_app() {
        let registry = registry_with(NamespaceRegistry::builtin());
        let a = registry.initialize_app(AppOptions::default(), Some("a")).unwrap();
        let b = registry.initialize_app(AppOptions::default(), Some("b")).unwrap();

        let ma = a.messaging().unwrap();
        let mb = b.messaging().unwrap();
        assert!(!Arc::ptr_eq(&ma, &mb));
        assert_eq!(ma.app_name(), "a");
        assert_eq!(mb.app_name(), "b");
    }

    #[tokio::test]
    async fn test_typed_module_access() {
        let registry = registry_with(NamespaceRegistry::builtin());
        let app = registry.initialize_app(AppOptions::default(), None).unwrap();

        let analytics = app.module_as::<ServiceModule>("analytics").unwrap();
        assert_eq!(analytics.native_module(), "NbAnalytics");
        assert_eq!(analytics.app_id(), app.id());
    }

    #[tokio::test]
    async fn test_unknown_namespace() {
        let registry = registry_with(NamespaceRegistry::builtin());
        let app = registry.initialize_app(AppOptions::default(), None).unwrap();

        assert!(matches!(app.module("storage"), Err(NbError::UnknownNamespace(_))));
        assert!(matches!(app.accessor("storage"), Err(NbError::UnknownNamespace(_))));
    }

    #[tokio::test]
    async fn test_extend_app_rules() {
        let registry = registry_with(NamespaceRegistry::builtin());
        let app = registry.initialize_app(AppOptions::default(), None).unwrap();

        app.extend_app(json!({ "x": 1 })).unwrap();
        app.extend_app(json!({ "x": 2 })).unwrap();
        assert_eq!(app.extended("x"), Some(json!(2)));

        let err = app.extend_app(json!({ "name": "new" })).unwrap_err();
        assert!(matches!(err, NbError::ProtectedProperty(ref k) if k == "name"));

        let err = app.extend_app(json!({ "messaging": {} })).unwrap_err();
        assert!(matches!(err, NbError::ProtectedProperty(ref k) if k == "messaging"));

        let err = app.extend_app(json!(["x"])).unwrap_err();
        assert!(matches!(err, NbError::InvalidArgument(_)));

        assert_eq!(app.name(), DEFAULT_APP_NAME);
        assert_eq!(app.extended_keys(), vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn test_summary() {
        let registry = registry_with(NamespaceRegistry::builtin());
        let app = registry.initialize_app(AppOptions::default(), Some("s")).unwrap();
        app.utils().unwrap();
        app.extend_app(json!({ "tag": "blue" })).unwrap();

        let summary = app.summary();
        assert_eq!(summary.name, "s");
        assert_eq!(summary.readiness, ReadinessState::Pending);
        assert!(!summary.native_originated);
        assert!(!summary.fully_configured);
        assert_eq!(summary.modules, vec!["utils".to_string()]);
        assert_eq!(summary.extended_keys, vec!["tag".to_string()]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["readiness"]["state"], "pending");
    }
}
