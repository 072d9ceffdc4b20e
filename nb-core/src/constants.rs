//! Application-wide constants.

/// Reserved name of the default app.
pub const DEFAULT_APP_NAME: &str = "[DEFAULT]";

/// SDK version reported by the hub.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name used for directories and log files.
pub const TOOL_NAME: &str = "nbridge";

/// Default time the CLI waits for an app handshake, in milliseconds.
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 10_000;

/// Built-in service namespace identifiers.
pub mod namespaces {
    pub const ANALYTICS: &str = "analytics";
    pub const CONFIG: &str = "config";
    pub const CRASHLYTICS: &str = "crashlytics";
    pub const IID: &str = "iid";
    pub const MESSAGING: &str = "messaging";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const UTILS: &str = "utils";

    /// All built-in namespaces, in registration order.
    pub const ALL: &[&str] = &[
        ANALYTICS,
        CONFIG,
        CRASHLYTICS,
        IID,
        MESSAGING,
        NOTIFICATIONS,
        UTILS,
    ];
}

/// Readiness event key for an app name.
pub fn ready_event_key(app_name: &str) -> String {
    format!("AppReady:{app_name}")
}
