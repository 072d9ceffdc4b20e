//! Module namespace descriptors.
//!
//! A namespace pairs an identifier with the factory that builds its module
//! for an app and a bag of app-independent statics.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use nb_core::constants::namespaces;
use nb_core::error::{NbError, NbResult};

use crate::app::App;
use crate::module::{ModuleRef, ServiceModule};

/// Factory building a namespace's module for one app.
pub type ModuleFactoryFn = dyn Fn(&App) -> ModuleRef + Send + Sync;

/// Static declaration of a service namespace.
#[derive(Clone)]
pub struct NamespaceDescriptor {
    id: String,
    factory: Arc<ModuleFactoryFn>,
    statics: Map<String, Value>,
}

impl NamespaceDescriptor {
    pub fn new<F>(id: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&App) -> ModuleRef + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            factory: Arc::new(factory),
            statics: Map::new(),
        }
    }

    pub fn with_statics(mut self, statics: Map<String, Value>) -> Self {
        self.statics = statics;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn statics(&self) -> &Map<String, Value> {
        &self.statics
    }

    pub(crate) fn construct(&self, app: &App) -> ModuleRef {
        (self.factory)(app)
    }
}

impl fmt::Debug for NamespaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceDescriptor")
            .field("id", &self.id)
            .field("statics", &self.statics)
            .finish_non_exhaustive()
    }
}

/// Ordered set of namespaces an app registry serves.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    descriptors: Vec<NamespaceDescriptor>,
}

/// Built-in namespaces and the native module each one is backed by.
const BUILTIN: &[(&str, &str)] = &[
    (namespaces::ANALYTICS, "NbAnalytics"),
    (namespaces::CONFIG, "NbRemoteConfig"),
    (namespaces::CRASHLYTICS, "NbCrashlytics"),
    (namespaces::IID, "NbInstanceId"),
    (namespaces::MESSAGING, "NbMessaging"),
    (namespaces::NOTIFICATIONS, "NbNotifications"),
    (namespaces::UTILS, "NbUtils"),
];

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The seven service namespaces every hub exposes.
    pub fn builtin() -> Self {
        let descriptors = BUILTIN
            .iter()
            .map(|&(id, native)| {
                let mut statics = Map::new();
                statics.insert("nativeModule".into(), json!(native));
                NamespaceDescriptor::new(id, move |app: &App| -> ModuleRef {
                    Arc::new(ServiceModule::new(app, id, native))
                })
                .with_statics(statics)
            })
            .collect();
        Self { descriptors }
    }

    /// Add a namespace. Ids must be unique.
    pub fn register(&mut self, descriptor: NamespaceDescriptor) -> NbResult<()> {
        if descriptor.id().trim().is_empty() {
            return Err(NbError::InvalidArgument("namespace id must not be empty".into()));
        }
        if self.contains(descriptor.id()) {
            return Err(NbError::DuplicateNamespace(descriptor.id().to_string()));
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&NamespaceDescriptor> {
        self.descriptors.iter().find(|d| d.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamespaceDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Every namespace's statics, keyed by namespace id.
    pub fn merged_statics(&self) -> Map<String, Value> {
        self.descriptors
            .iter()
            .map(|d| (d.id().to_string(), Value::Object(d.statics().clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_namespaces() {
        let registry = NamespaceRegistry::builtin();
        assert_eq!(registry.len(), namespaces::ALL.len());
        assert_eq!(registry.ids(), namespaces::ALL.to_vec());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = NamespaceRegistry::builtin();
        let dup = NamespaceDescriptor::new("analytics", |app: &App| -> ModuleRef {
            Arc::new(ServiceModule::new(app, "analytics", "Other"))
        });
        let err = registry.register(dup).unwrap_err();
        assert!(matches!(err, NbError::DuplicateNamespace(ref id) if id == "analytics"));
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_register_rejects_empty_id() {
        let mut registry = NamespaceRegistry::new();
        let blank = NamespaceDescriptor::new(" ", |app: &App| -> ModuleRef {
            Arc::new(ServiceModule::new(app, " ", "Blank"))
        });
        assert!(matches!(
            registry.register(blank),
            Err(NbError::InvalidArgument(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_merged_statics() {
        let mut registry = NamespaceRegistry::builtin();
        let mut statics = Map::new();
        statics.insert("LogLevel".into(), json!({ "DEBUG": 0, "INFO": 1 }));
        registry
            .register(
                NamespaceDescriptor::new("perf", |app: &App| -> ModuleRef {
                    Arc::new(ServiceModule::new(app, "perf", "NbPerf"))
                })
                .with_statics(statics),
            )
            .unwrap();

        let merged = registry.merged_statics();
        assert_eq!(merged.len(), 8);
        assert_eq!(merged["messaging"]["nativeModule"], "NbMessaging");
        assert_eq!(merged["perf"]["LogLevel"]["INFO"], 1);
    }
}
