//! Bridge configuration management.
//!
//! Handles loading, saving, and accessing the tool configuration: logging,
//! app defaults, and the description of the simulated native layer.
//! Configuration is persisted as TOML on disk.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_READY_TIMEOUT_MS;
use crate::error::{NbError, NbResult};
use crate::options::AppOptions;
use crate::platform;

/// Top-level bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// App registry settings.
    #[serde(default)]
    pub apps: AppsConfig,

    /// Simulated native layer settings.
    #[serde(default)]
    pub native: NativeConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

/// App registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppsConfig {
    /// How long callers wait for a handshake by default (0 = forever).
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_ms: u64,

    /// Register apps the native layer already knows about at bootstrap.
    #[serde(default = "default_true")]
    pub auto_bootstrap_native: bool,
}

/// Description of the native layer used by the simulated bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeConfig {
    /// Whether the native core module is present.
    #[serde(default = "default_true")]
    pub available: bool,

    /// Artificial delay before a handshake completes, in milliseconds.
    #[serde(default)]
    pub init_latency_ms: u64,

    /// Apps initialized natively before this process started.
    #[serde(default)]
    pub existing_apps: Vec<NativeAppConfig>,

    /// API keys the native layer refuses during the handshake.
    #[serde(default)]
    pub rejected_api_keys: Vec<RejectedApiKey>,

    /// App names whose native deletion fails.
    #[serde(default)]
    pub failing_deletes: Vec<String>,
}

/// A natively pre-initialized app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeAppConfig {
    pub name: String,
    #[serde(default)]
    pub options: AppOptions,
}

/// An API key the native handshake rejects, with the message it reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedApiKey {
    pub api_key: String,
    #[serde(default = "default_reject_message")]
    pub message: String,
}

// Default value functions for serde

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_ready_timeout() -> u64 {
    DEFAULT_READY_TIMEOUT_MS
}

fn default_reject_message() -> String {
    "invalid api key".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl Default for AppsConfig {
    fn default() -> Self {
        Self {
            ready_timeout_ms: default_ready_timeout(),
            auto_bootstrap_native: true,
        }
    }
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            available: true,
            init_latency_ms: 0,
            existing_apps: Vec::new(),
            rejected_api_keys: Vec::new(),
            failing_deletes: Vec::new(),
        }
    }
}

impl AppsConfig {
    /// The configured handshake timeout, `None` meaning wait forever.
    pub fn ready_timeout(&self) -> Option<std::time::Duration> {
        (self.ready_timeout_ms > 0).then(|| std::time::Duration::from_millis(self.ready_timeout_ms))
    }
}

impl BridgeConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> NbResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> NbResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: BridgeConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> NbResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| NbError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> NbResult<PathBuf> {
        Ok(platform::config_dir()?.join("config.toml"))
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> NbResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Ok(platform::data_dir()?.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Reject configurations the registry could never honour.
    pub fn validate(&self) -> NbResult<()> {
        let mut seen = std::collections::HashSet::new();
        for app in &self.native.existing_apps {
            if app.name.trim().is_empty() {
                return Err(NbError::Config("native app with empty name".into()));
            }
            if !seen.insert(app.name.as_str()) {
                return Err(NbError::Config(format!(
                    "native app '{}' listed more than once",
                    app.name
                )));
            }
        }
        Ok(())
    }
}
