//! Service modules and the per-app module cache.
//!
//! Concrete service modules live outside the registry; it only needs to
//! build them through their namespace factory and hand the same instance
//! back on every later access.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::app::App;
use crate::namespace::NamespaceDescriptor;

/// A service module bound to one app.
pub trait Module: Any + fmt::Debug + Send + Sync {
    /// Namespace this module was built for.
    fn namespace(&self) -> &str;

    /// Name of the app this module belongs to.
    fn app_name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    /// Upcast used for typed access through [`App::module_as`].
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Shared handle to a constructed module.
pub type ModuleRef = Arc<dyn Module>;

/// Module used by the built-in namespaces.
///
/// Records which app and native module it was created for; the actual
/// service behaviour belongs to the platform layer.
#[derive(Debug)]
pub struct ServiceModule {
    namespace: String,
    native_module: String,
    app_name: String,
    app_id: Uuid,
    created_at: DateTime<Utc>,
}

impl ServiceModule {
    pub fn new(app: &App, namespace: &str, native_module: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            native_module: native_module.to_string(),
            app_name: app.name().to_string(),
            app_id: app.id(),
            created_at: Utc::now(),
        }
    }

    /// Name of the native module backing this service.
    pub fn native_module(&self) -> &str {
        &self.native_module
    }

    /// Identity of the app instance this module was built for.
    pub fn app_id(&self) -> Uuid {
        self.app_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Module for ServiceModule {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn app_name(&self) -> &str {
        &self.app_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Lazily populated modules of one app, one slot per namespace.
///
/// The map lock only guards slot lookup; construction runs inside the slot's
/// `OnceLock`, so callers racing on first access all receive the instance
/// produced by the single factory run.
#[derive(Default)]
pub(crate) struct ModuleCache {
    slots: Mutex<HashMap<String, Arc<OnceLock<ModuleRef>>>>,
}

impl ModuleCache {
    pub(crate) fn get_or_create(&self, app: &App, descriptor: &NamespaceDescriptor) -> ModuleRef {
        let slot = self
            .lock()
            .entry(descriptor.id().to_string())
            .or_default()
            .clone();

        slot.get_or_init(|| {
            debug!("constructing {} module for app {}", descriptor.id(), app.name());
            descriptor.construct(app)
        })
        .clone()
    }

    /// Namespaces whose module has been constructed.
    pub(crate) fn constructed(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .lock()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<OnceLock<ModuleRef>>>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}
