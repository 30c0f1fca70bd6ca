//! Coordinator error types.
//!
//! Most failures inside message processing are deliberately degraded rather
//! than surfaced -- the caller always gets a processing task back -- so
//! [`CoordinatorError`] covers the administrative surfaces: session
//! bookkeeping, snapshot export/import, and configuration loading.

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// An error propagated from the task registry.
    #[error("registry error: {0}")]
    Registry(#[from] conductor_registry::RegistryError),

    /// An error propagated from the intent engine.
    #[error("intent error: {0}")]
    Intent(#[from] conductor_intent::IntentError),

    /// Configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the coordinator crate.
pub type Result<T> = std::result::Result<T, CoordinatorError>;
