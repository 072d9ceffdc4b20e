//! Readiness signalling for native app handshakes.
//!
//! The channel is a plain one-shot publish/subscribe primitive keyed by app
//! name: an emission wakes whoever is subscribed at that moment and nobody
//! after. Apps keep their own terminal state ([`ReadinessCell`]) so late
//! callers never wait on an emission that already happened.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::debug;

use nb_core::constants::ready_event_key;

/// Readiness of an app's native handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum ReadinessState {
    /// Handshake not completed (or never dispatched).
    Pending,
    /// Native layer confirmed the app.
    Ready,
    /// Native layer rejected the app with this message.
    Failed(String),
}

impl ReadinessState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Ready => write!(f, "ready"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// Payload delivered to readiness subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyEvent {
    pub name: String,
    pub error: Option<String>,
}

/// Process-wide readiness channel, keyed by app name.
#[derive(Clone, Default)]
pub struct ReadinessChannel {
    waiters: Arc<Mutex<HashMap<String, Vec<oneshot::Sender<ReadyEvent>>>>>,
}

impl ReadinessChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver the handshake result for `name` to every current subscriber.
    ///
    /// Returns how many subscribers received it.
    pub fn emit_ready(&self, name: &str, error: Option<String>) -> usize {
        let key = ready_event_key(name);
        let waiters = self.lock().remove(&key).unwrap_or_default();

        let event = ReadyEvent {
            name: name.to_string(),
            error,
        };
        let delivered = waiters
            .into_iter()
            .map(|tx| tx.send(event.clone()).is_ok())
            .filter(|sent| *sent)
            .count();
        debug!("readiness: emitted {key} to {delivered} subscriber(s)");
        delivered
    }

    /// Subscribe to the next emission for `name`.
    pub fn await_ready(&self, name: &str) -> ReadyWaiter {
        let key = ready_event_key(name);
        let (tx, rx) = oneshot::channel();
        let mut waiters = self.lock();
        prune(&mut waiters);
        waiters.entry(key).or_default().push(tx);
        ReadyWaiter {
            name: name.to_string(),
            rx,
        }
    }

    /// Number of live subscribers for `name`.
    pub fn waiter_count(&self, name: &str) -> usize {
        let mut waiters = self.lock();
        prune(&mut waiters);
        waiters.get(&ready_event_key(name)).map_or(0, Vec::len)
    }

    /// Number of names with at least one live subscriber.
    pub fn subscribed_names(&self) -> usize {
        let mut waiters = self.lock();
        prune(&mut waiters);
        waiters.len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<oneshot::Sender<ReadyEvent>>>> {
        self.waiters.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Drop closed subscribers, and names left without any.
fn prune(waiters: &mut HashMap<String, Vec<oneshot::Sender<ReadyEvent>>>) {
    waiters.retain(|_, slot| {
        slot.retain(|tx| !tx.is_closed());
        !slot.is_empty()
    });
}

/// Pending subscription returned by [`ReadinessChannel::await_ready`].
#[derive(Debug)]
pub struct ReadyWaiter {
    name: String,
    rx: oneshot::Receiver<ReadyEvent>,
}

impl ReadyWaiter {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the emission. `None` if the channel went away first.
    pub async fn wait(self) -> Option<ReadyEvent> {
        self.rx.await.ok()
    }
}

/// An app's cached readiness, written once by the handshake.
pub(crate) struct ReadinessCell {
    inner: Mutex<(ReadinessState, Option<DateTime<Utc>>)>,
}

impl ReadinessCell {
    pub(crate) fn pending() -> Self {
        Self {
            inner: Mutex::new((ReadinessState::Pending, None)),
        }
    }

    pub(crate) fn ready() -> Self {
        Self {
            inner: Mutex::new((ReadinessState::Ready, Some(Utc::now()))),
        }
    }

    pub(crate) fn state(&self) -> ReadinessState {
        self.lock().0.clone()
    }

    pub(crate) fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.lock().1
    }

    /// Leave `Pending` for good. Returns `false` if already terminal.
    pub(crate) fn resolve(&self, error: Option<String>) -> bool {
        let mut inner = self.lock();
        if inner.0.is_terminal() {
            return false;
        }
        inner.0 = match error {
            None => ReadinessState::Ready,
            Some(e) => ReadinessState::Failed(e),
        };
        inner.1 = Some(Utc::now());
        true
    }

    fn lock(&self) -> MutexGuard<'_, (ReadinessState, Option<DateTime<Utc>>)> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
