//! Native Bridge Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other nbridge crates:
//! - App options (the per-app configuration snapshot)
//! - Bridge configuration (logging, app defaults, simulated native layer)
//! - Global error types covering the registry error taxonomy
//! - Structured logging with tracing
//! - Platform directory helpers
//! - Common constants (default app name, SDK version)

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod options;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::BridgeConfig;
pub use constants::{DEFAULT_APP_NAME, SDK_VERSION};
pub use error::{NbError, NbResult};
pub use logging::init_logging;
pub use options::AppOptions;
