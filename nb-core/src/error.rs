//! Global error types for the native bridge.
//!
//! Every failure the registry, app instances and the native boundary can
//! report is unified into a single `NbError` enum with conversions from
//! underlying library errors.

use thiserror::Error;

/// Convenience type alias for Results using NbError.
pub type NbResult<T> = Result<T, NbError>;

/// Unified error type covering all error categories in the bridge.
#[derive(Error, Debug)]
pub enum NbError {
    // -- Registry errors --
    /// An app with this name is already registered.
    #[error("app '{0}' has already been initialized")]
    DuplicateApp(String),

    /// No app is registered under this name.
    #[error("no app named '{0}' has been initialized")]
    AppNotFound(String),

    /// The default app came from the native layer and cannot be deleted.
    #[error("unable to delete the default native app instance")]
    ProtectedDefaultApp,

    /// The app has been deleted and can no longer hand out modules.
    #[error("app '{0}' has been deleted")]
    AppDeleted(String),

    // -- Argument errors --
    /// A caller passed something that is not usable for this operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `extend_app` tried to overwrite a built-in property.
    #[error("property '{0}' is protected and cannot be overridden by extend_app")]
    ProtectedProperty(String),

    // -- Namespace errors --
    /// The requested module namespace is not registered.
    #[error("unknown module namespace: {0}")]
    UnknownNamespace(String),

    /// A namespace with this id was already registered.
    #[error("module namespace '{0}' is already registered")]
    DuplicateNamespace(String),

    // -- Native boundary errors --
    /// The native core module is not available in this process.
    #[error("native core module is not available")]
    MissingCore,

    /// The native initialization handshake reported a failure.
    #[error("{0}")]
    NativeInitialization(String),

    /// The native layer failed to delete an app.
    #[error("native delete failed for app '{name}': {message}")]
    NativeDeletion {
        /// App that could not be deleted.
        name: String,
        /// Message supplied by the native layer.
        message: String,
    },

    /// Generic failure reported by the native layer.
    #[error("native error: {0}")]
    Native(String),

    /// Waiting on the native layer took longer than allowed.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The process-wide hub has already been installed.
    #[error("the app hub has already been installed")]
    AlreadyInstalled,

    // -- Configuration errors --
    /// Failed to load or parse configuration.
    #[error("configuration error: {0}")]
    Config(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NbError {
    /// Short machine-readable code, stable across message wording changes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateApp(_) => "app/duplicate-app",
            Self::AppNotFound(_) => "app/no-app",
            Self::ProtectedDefaultApp => "app/protected-default-app",
            Self::AppDeleted(_) => "app/app-deleted",
            Self::InvalidArgument(_) => "app/invalid-argument",
            Self::ProtectedProperty(_) => "app/protected-property",
            Self::UnknownNamespace(_) => "app/unknown-namespace",
            Self::DuplicateNamespace(_) => "app/duplicate-namespace",
            Self::MissingCore => "app/missing-core",
            Self::NativeInitialization(_) => "app/native-initialization",
            Self::NativeDeletion { .. } => "app/native-deletion",
            Self::Native(_) => "app/native",
            Self::Timeout(_) => "app/timeout",
            Self::AlreadyInstalled => "app/already-installed",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) | Self::Other(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for NbError {
    fn from(e: serde_json::Error) -> Self {
        NbError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for NbError {
    fn from(e: toml::de::Error) -> Self {
        NbError::Config(e.to_string())
    }
}
