//! Native Bridge Apps - the named app registry.
//!
//! This crate provides:
//! - Module namespaces (id + factory + statics) and the per-app module cache
//! - The readiness channel carrying one-shot native handshake results
//! - App instances: options, extension table, lazy modules, readiness
//! - The app registry: creation, lookup, enumeration, deletion, native bootstrap
//! - The hub facade exposing registry operations and per-namespace entry points

pub mod app;
pub mod extension;
pub mod hub;
pub mod module;
pub mod namespace;
pub mod readiness;
pub mod registry;

// Re-export key types
pub use app::{App, AppSummary, ModuleAccessor};
pub use extension::INTRINSIC_PROPERTIES;
pub use hub::{AppHub, NamespaceEntry};
pub use module::{Module, ModuleRef, ServiceModule};
pub use namespace::{NamespaceDescriptor, NamespaceRegistry};
pub use readiness::{ReadinessChannel, ReadinessState, ReadyEvent, ReadyWaiter};
pub use registry::AppRegistry;
