//! Registry error types.
//!
//! All registry operations surface errors through [`RegistryError`].  Each
//! variant carries enough context for callers to decide how to handle the
//! failure without inspecting opaque strings.

use uuid::Uuid;

/// Unified error type for the task registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The referenced task does not exist in the registry.
    #[error("task not found: {task_id}")]
    TaskNotFound {
        /// The [`Uuid`] that was looked up.
        task_id: Uuid,
    },

    /// A task was submitted with a `parent_task_id` that references no
    /// registered task.
    #[error("parent task not found: {parent_id}")]
    ParentNotFound { parent_id: Uuid },

    /// An attempted mutation would break a registry invariant.  Rejected,
    /// never silently applied.
    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the registry crate.
pub type Result<T> = std::result::Result<T, RegistryError>;
