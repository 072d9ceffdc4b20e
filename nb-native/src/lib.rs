//! Native Bridge boundary - the contract between the app registry and the
//! platform layer that actually initializes and deletes apps.
//!
//! This crate provides:
//! - The `NativeBridge` trait the registry consumes
//! - `NativeApp`, the description of a natively pre-initialized app
//! - `SimulatedBridge`, an in-memory native layer driven by `NativeConfig`,
//!   with an optional manual mode where each handshake is completed by the host

pub mod bridge;
pub mod simulated;

// Re-export key types
pub use bridge::{NativeApp, NativeBridge, SharedBridge};
pub use simulated::SimulatedBridge;
