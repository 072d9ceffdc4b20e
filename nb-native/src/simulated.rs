//! In-memory native layer.
//!
//! Behaves like the platform bridge without a platform: pre-existing apps,
//! rejected API keys, failing deletions and handshake latency all come from
//! `NativeConfig`. In manual mode every handshake is held until the host
//! calls [`SimulatedBridge::complete`], which lets callers observe apps while
//! they are still pending.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use nb_core::config::{NativeAppConfig, NativeConfig, RejectedApiKey};
use nb_core::error::{NbError, NbResult};
use nb_core::options::AppOptions;

use crate::bridge::{NativeApp, NativeBridge};

/// Outcome the host hands to a held handshake.
pub type HandshakeOutcome = Result<(), String>;

#[derive(Default)]
struct SimState {
    /// Apps the native layer currently considers initialized.
    apps: Vec<NativeApp>,
    /// Handshakes waiting for the host, manual mode only.
    held: HashMap<String, oneshot::Sender<HandshakeOutcome>>,
    /// Outcomes supplied before the matching handshake started.
    early: HashMap<String, HandshakeOutcome>,
    init_calls: HashMap<String, usize>,
    delete_calls: HashMap<String, usize>,
}

/// Simulated native layer.
pub struct SimulatedBridge {
    config: NativeConfig,
    manual: bool,
    state: Mutex<SimState>,
}

impl SimulatedBridge {
    /// Create a bridge from the native section of the configuration.
    pub fn new(config: NativeConfig) -> Self {
        let apps = config
            .existing_apps
            .iter()
            .map(|a| NativeApp {
                name: a.name.clone(),
                options: a.options.clone(),
            })
            .collect();
        Self {
            config,
            manual: false,
            state: Mutex::new(SimState {
                apps,
                ..SimState::default()
            }),
        }
    }

    /// A bridge whose native core module is missing.
    pub fn unavailable() -> Self {
        Self::new(NativeConfig {
            available: false,
            ..NativeConfig::default()
        })
    }

    /// Hold every handshake until [`complete`](Self::complete) is called.
    pub fn with_manual_completion(mut self) -> Self {
        self.manual = true;
        self
    }

    /// Add an app that already exists on the native side.
    pub fn with_existing_app(mut self, name: &str, options: AppOptions) -> Self {
        self.config.existing_apps.push(NativeAppConfig {
            name: name.to_string(),
            options: options.clone(),
        });
        self.lock().apps.push(NativeApp {
            name: name.to_string(),
            options,
        });
        self
    }

    /// Make the handshake fail for apps using this API key.
    pub fn with_rejected_api_key(mut self, api_key: &str, message: &str) -> Self {
        self.config.rejected_api_keys.push(RejectedApiKey {
            api_key: api_key.to_string(),
            message: message.to_string(),
        });
        self
    }

    /// Make native deletion fail for this app name.
    pub fn with_failing_delete(mut self, name: &str) -> Self {
        self.config.failing_deletes.push(name.to_string());
        self
    }

    /// Complete a held handshake. Returns `false` if the outcome was queued
    /// because the handshake has not started yet.
    pub fn complete(&self, name: &str, outcome: HandshakeOutcome) -> bool {
        let mut state = self.lock();
        match state.held.remove(name) {
            Some(tx) => {
                debug!("simulated bridge: releasing handshake for {name}");
                // The waiting handshake may have been dropped with its runtime.
                let _ = tx.send(outcome);
                true
            }
            None => {
                debug!("simulated bridge: queueing outcome for {name}");
                state.early.insert(name.to_string(), outcome);
                false
            }
        }
    }

    /// Whether a handshake for `name` is currently held.
    pub fn is_held(&self, name: &str) -> bool {
        self.lock().held.contains_key(name)
    }

    /// How many times the handshake ran for `name`.
    pub fn init_calls(&self, name: &str) -> usize {
        self.lock().init_calls.get(name).copied().unwrap_or(0)
    }

    /// How many times native deletion ran for `name`.
    pub fn delete_calls(&self, name: &str) -> usize {
        self.lock().delete_calls.get(name).copied().unwrap_or(0)
    }

    /// Names of apps the native layer currently considers initialized.
    pub fn native_app_names(&self) -> Vec<String> {
        self.lock().apps.iter().map(|a| a.name.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn rejection_for(&self, options: &AppOptions) -> Option<&str> {
        let key = options.api_key.as_deref()?;
        self.config
            .rejected_api_keys
            .iter()
            .find(|r| r.api_key == key)
            .map(|r| r.message.as_str())
    }

    async fn wait_for_host(&self, name: &str) -> HandshakeOutcome {
        let rx = {
            let mut state = self.lock();
            if let Some(outcome) = state.early.remove(name) {
                return outcome;
            }
            let (tx, rx) = oneshot::channel();
            state.held.insert(name.to_string(), tx);
            rx
        };
        debug!("simulated bridge: holding handshake for {name}");
        rx.await
            .unwrap_or_else(|_| Err("handshake abandoned by host".to_string()))
    }
}

impl Default for SimulatedBridge {
    fn default() -> Self {
        Self::new(NativeConfig::default())
    }
}

#[async_trait]
impl NativeBridge for SimulatedBridge {
    fn is_available(&self) -> bool {
        self.config.available
    }

    async fn initialize_app(&self, name: &str, options: &AppOptions) -> NbResult<()> {
        *self.lock().init_calls.entry(name.to_string()).or_default() += 1;

        if self.config.init_latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.init_latency_ms)).await;
        }

        let outcome = if self.manual {
            self.wait_for_host(name).await
        } else if let Some(message) = self.rejection_for(options) {
            Err(message.to_string())
        } else {
            Ok(())
        };

        match outcome {
            Ok(()) => {
                let mut state = self.lock();
                state.apps.retain(|a| a.name != name);
                state.apps.push(NativeApp {
                    name: name.to_string(),
                    options: options.clone(),
                });
                info!("simulated bridge: initialized {name}");
                Ok(())
            }
            Err(message) => {
                warn!("simulated bridge: handshake for {name} failed: {message}");
                Err(NbError::Native(message))
            }
        }
    }

    async fn delete_app(&self, name: &str) -> NbResult<()> {
        let mut state = self.lock();
        *state.delete_calls.entry(name.to_string()).or_default() += 1;

        if self.config.failing_deletes.iter().any(|n| n == name) {
            warn!("simulated bridge: refusing to delete {name}");
            return Err(NbError::NativeDeletion {
                name: name.to_string(),
                message: "native app is busy".to_string(),
            });
        }

        state.apps.retain(|a| a.name != name);
        info!("simulated bridge: deleted {name}");
        Ok(())
    }

    async fn list_existing_apps(&self) -> NbResult<Vec<NativeApp>> {
        Ok(self.lock().apps.clone())
    }
}
