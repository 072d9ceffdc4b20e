//! Registry, deletion, module cache and extension integration tests.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use nb_apps::{
    App, AppRegistry, ModuleRef, NamespaceDescriptor, NamespaceRegistry, ServiceModule,
    INTRINSIC_PROPERTIES,
};
use nb_core::config::AppsConfig;
use nb_core::error::{NbError, NbResult};
use nb_core::options::AppOptions;
use nb_core::DEFAULT_APP_NAME;
use nb_native::{NativeApp, NativeBridge, SimulatedBridge};

// ---- Registration ----

#[tokio::test]
async fn duplicate_registration_leaves_registry_unchanged() {
    let (registry, _bridge) = common::manual_registry().await;
    registry.initialize_app(common::full_options(), Some("dup")).unwrap();
    let before: Vec<_> = registry.apps().iter().map(App::id).collect();

    let err = registry
        .initialize_app(common::partial_options(), Some("dup"))
        .unwrap_err();
    assert!(matches!(err, NbError::DuplicateApp(ref n) if n == "dup"));

    let after: Vec<_> = registry.apps().iter().map(App::id).collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn default_lookup_matches_explicit_name() {
    let (hub, _bridge) = common::hub_with_native_default().await;
    assert_eq!(hub.app(None).unwrap(), hub.app(Some(DEFAULT_APP_NAME)).unwrap());
}

#[tokio::test]
async fn apps_count_tracks_registrations_and_deletions() {
    let (registry, _bridge) = common::manual_registry().await;
    for (i, name) in ["one", "two", "three"].iter().enumerate() {
        registry.initialize_app(common::partial_options(), Some(*name)).unwrap();
        assert_eq!(registry.apps().len(), i + 1);
    }

    registry.delete_app("two").await.unwrap();
    let names: Vec<String> = registry.apps().iter().map(|a| a.name().to_string()).collect();
    assert_eq!(names, vec!["one", "three"]);
}

// ---- Deletion ----

#[tokio::test]
async fn native_default_app_is_protected() {
    let (hub, bridge) = common::hub_with_native_default().await;
    let default = hub.app(None).unwrap();

    let err = default.delete().await.unwrap_err();
    assert!(matches!(err, NbError::ProtectedDefaultApp));

    let err = hub.registry().delete_app(DEFAULT_APP_NAME).await.unwrap_err();
    assert!(matches!(err, NbError::ProtectedDefaultApp));

    assert_eq!(hub.apps().len(), 1);
    assert_eq!(bridge.delete_calls(DEFAULT_APP_NAME), 0);
}

#[tokio::test]
async fn explicit_default_app_can_be_deleted() {
    let (registry, bridge) = common::manual_registry().await;
    registry.initialize_app(common::partial_options(), None).unwrap();

    registry.delete_app(DEFAULT_APP_NAME).await.unwrap();
    assert!(registry.is_empty());
    assert_eq!(bridge.delete_calls(DEFAULT_APP_NAME), 1);
}

#[tokio::test]
async fn failed_native_delete_keeps_app_registered() {
    let bridge = Arc::new(SimulatedBridge::default().with_failing_delete("stuck"));
    let registry = common::registry_over(bridge.clone()).await;
    let app = registry
        .initialize_app(common::partial_options(), Some("stuck"))
        .unwrap();
    let module = app.utils().unwrap();

    let err = app.delete().await.unwrap_err();
    assert!(matches!(err, NbError::NativeDeletion { .. }));
    assert!(registry.contains("stuck"));
    assert!(!app.is_deleted());
    assert!(Arc::ptr_eq(&module, &app.utils().unwrap()));

    // The failed attempt released the instance for another try.
    let err = app.delete().await.unwrap_err();
    assert!(matches!(err, NbError::NativeDeletion { .. }));
    assert_eq!(bridge.delete_calls("stuck"), 2);
}

/// Bridge whose native delete takes a while to answer.
#[derive(Default)]
struct SlowDelete {
    deletes: AtomicUsize,
}

#[async_trait]
impl NativeBridge for SlowDelete {
    async fn initialize_app(&self, _name: &str, _options: &AppOptions) -> NbResult<()> {
        Ok(())
    }

    async fn delete_app(&self, _name: &str) -> NbResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(())
    }

    async fn list_existing_apps(&self) -> NbResult<Vec<NativeApp>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn overlapping_deletes_reach_native_layer_once() {
    let bridge = Arc::new(SlowDelete::default());
    let registry = AppRegistry::bootstrap(
        bridge.clone(),
        NamespaceRegistry::builtin(),
        AppsConfig::default(),
    )
    .await
    .unwrap();
    let app = registry
        .initialize_app(common::partial_options(), Some("twice"))
        .unwrap();

    let (first, second) = tokio::join!(app.delete(), app.delete());
    let outcomes = [first, second];

    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(NbError::AppDeleted(n)) if n == "twice")));
    assert_eq!(bridge.deletes.load(Ordering::SeqCst), 1);
    assert!(app.is_deleted());
    assert!(!registry.contains("twice"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn module_access_racing_delete_leaves_nothing_cached() {
    let (registry, _bridge) = common::manual_registry().await;
    let app = registry
        .initialize_app(common::partial_options(), Some("racing"))
        .unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let app = app.clone();
            tokio::task::spawn_blocking(move || while app.utils().is_ok() {})
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(5)).await;
    app.delete().await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }

    assert!(app.summary().modules.is_empty());
    assert!(matches!(app.utils(), Err(NbError::AppDeleted(_))));
}

#[tokio::test]
async fn deleted_app_is_gone_and_refuses_modules() {
    let (registry, _bridge) = common::manual_registry().await;
    let app = registry
        .initialize_app(common::partial_options(), Some("gone"))
        .unwrap();
    app.iid().unwrap();

    app.delete().await.unwrap();
    assert!(app.is_deleted());
    assert!(matches!(registry.app(Some("gone")), Err(NbError::AppNotFound(_))));
    assert!(matches!(app.iid(), Err(NbError::AppDeleted(_))));
    assert!(matches!(app.delete().await, Err(NbError::AppDeleted(_))));
    assert!(matches!(
        registry.delete_app("gone").await,
        Err(NbError::AppNotFound(_))
    ));
}

#[tokio::test]
async fn name_can_be_reused_after_delete() {
    let (registry, _bridge) = common::manual_registry().await;
    let old = registry
        .initialize_app(common::partial_options(), Some("again"))
        .unwrap();
    let old_module = old.config().unwrap();
    old.delete().await.unwrap();

    let new = registry
        .initialize_app(common::partial_options(), Some("again"))
        .unwrap();
    assert_ne!(old.id(), new.id());
    assert!(!Arc::ptr_eq(&old_module, &new.config().unwrap()));
}

// ---- Module cache ----

#[tokio::test]
async fn module_factory_runs_once_under_contention() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut namespaces = NamespaceRegistry::builtin();
    namespaces
        .register(NamespaceDescriptor::new("slow", move |app: &App| -> ModuleRef {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            Arc::new(ServiceModule::new(app, "slow", "NbSlow"))
        }))
        .unwrap();

    let registry = AppRegistry::new(
        Arc::new(SimulatedBridge::default()),
        namespaces,
        AppsConfig::default(),
    )
    .unwrap();
    let app = registry.initialize_app(AppOptions::default(), None).unwrap();

    let modules: Vec<ModuleRef> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let accessor = app.accessor("slow").unwrap();
                scope.spawn(move || accessor.get().unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for module in &modules[1..] {
        assert!(Arc::ptr_eq(&modules[0], module));
    }
    assert_eq!(app.summary().modules, vec!["slow".to_string()]);
}

#[tokio::test]
async fn every_builtin_accessor_is_cached() {
    let (registry, _bridge) = common::manual_registry().await;
    let app = registry
        .initialize_app(common::full_options(), Some("all"))
        .unwrap();

    let accessors: [fn(&App) -> NbResult<ModuleRef>; 7] = [
        App::analytics,
        App::config,
        App::crashlytics,
        App::iid,
        App::messaging,
        App::notifications,
        App::utils,
    ];
    for accessor in accessors {
        let first = accessor(&app).unwrap();
        let second = accessor(&app).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.app_name(), "all");
    }
    assert_eq!(app.summary().modules.len(), 7);
}

// ---- Extension ----

#[tokio::test]
async fn extend_app_overwrites_and_protects() {
    let (registry, _bridge) = common::manual_registry().await;
    let app = registry
        .initialize_app(common::partial_options(), Some("ext"))
        .unwrap();

    app.extend_app(json!({ "x": 1 })).unwrap();
    app.extend_app(json!({ "x": 2 })).unwrap();
    assert_eq!(app.extended("x"), Some(json!(2)));

    let err = app.extend_app(json!({ "name": "new" })).unwrap_err();
    assert!(matches!(err, NbError::ProtectedProperty(ref k) if k == "name"));
    assert_eq!(app.name(), "ext");

    let err = app.extend_app(json!(42)).unwrap_err();
    assert!(matches!(err, NbError::InvalidArgument(_)));

    // Visible through any handle to the same instance.
    let same = registry.app(Some("ext")).unwrap();
    assert_eq!(same.extended("x"), Some(json!(2)));
}

#[tokio::test]
async fn extend_app_refuses_every_builtin_property() {
    let (registry, _bridge) = common::manual_registry().await;
    let app = registry
        .initialize_app(common::partial_options(), Some("builtin"))
        .unwrap();

    let mut builtin: Vec<&str> = INTRINSIC_PROPERTIES.to_vec();
    builtin.extend(registry.namespaces().ids());
    for key in builtin {
        let err = app.extend_app(json!({ key: 1 })).unwrap_err();
        assert!(
            matches!(err, NbError::ProtectedProperty(ref k) if k == key),
            "{key} was writable"
        );
    }
    assert!(app.extended_keys().is_empty());
}

// ---- Bootstrap failures ----

struct BrokenListing;

#[async_trait]
impl NativeBridge for BrokenListing {
    async fn initialize_app(&self, _name: &str, _options: &AppOptions) -> NbResult<()> {
        Ok(())
    }

    async fn delete_app(&self, _name: &str) -> NbResult<()> {
        Ok(())
    }

    async fn list_existing_apps(&self) -> NbResult<Vec<NativeApp>> {
        Err(NbError::Native("bridge not ready".into()))
    }
}

#[tokio::test]
async fn bootstrap_surfaces_native_listing_failure() {
    let result = AppRegistry::bootstrap(
        Arc::new(BrokenListing),
        NamespaceRegistry::builtin(),
        AppsConfig::default(),
    )
    .await;
    assert!(matches!(result, Err(NbError::Native(ref m)) if m == "bridge not ready"));
}

#[tokio::test]
async fn bootstrap_requires_native_core() {
    let result = AppRegistry::bootstrap(
        Arc::new(SimulatedBridge::unavailable()),
        NamespaceRegistry::builtin(),
        AppsConfig::default(),
    )
    .await;
    assert!(matches!(result, Err(NbError::MissingCore)));
}
