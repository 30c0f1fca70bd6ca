//! Intent engine error types.
//!
//! Classification itself never fails -- it degrades to a low-confidence
//! general intent -- so [`IntentError`] covers only workflow expansion and
//! propagated registry failures.

#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    // -- Workflow errors ------------------------------------------------------
    /// The requested workflow template is not in the catalog.
    #[error("unknown workflow template: {template}")]
    UnknownWorkflowTemplate { template: String },

    /// A step index does not exist in the workflow instance.
    #[error("workflow step {index} out of range (workflow has {count} steps)")]
    StepOutOfRange { index: usize, count: usize },

    // -- Upstream crate errors -----------------------------------------------
    /// An error propagated from the task registry.
    #[error("registry error: {0}")]
    Registry(#[from] conductor_registry::RegistryError),

    // -- Serialization -------------------------------------------------------
    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the intent crate.
pub type Result<T> = std::result::Result<T, IntentError>;
