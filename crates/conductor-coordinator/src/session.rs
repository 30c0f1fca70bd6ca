//! Coordination session state.
//!
//! One coordinator instance runs at most one session at a time.  The
//! session's mutable state -- the recognized-intent log, active workflows,
//! latest suggestions, analytics snapshot -- lives behind a single mutex in
//! the coordinator; this module defines that state plus the read-only
//! [`SessionStatus`] view and the serializable [`SessionSnapshot`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use conductor_intent::{Intent, WorkflowProgress};
use conductor_registry::{Task, TaskDraft, TaskId};

use crate::agent::AgentProvider;
use crate::analytics::Analytics;
use crate::config::CoordinatorConfig;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Mutable session state
// ---------------------------------------------------------------------------

/// The coordinator's per-session mutable state.  Guarded by the
/// coordinator's session mutex; never locked across an await point.
pub(crate) struct SessionState {
    /// Whether a session is active.
    pub(crate) coordinating: bool,
    /// The session anchor task, if a session has been started.
    pub(crate) session_task_id: Option<TaskId>,
    /// Append-only log of every intent recognized during the session, in
    /// classification-completion order.
    pub(crate) recognized_intents: Vec<Intent>,
    /// Active workflow instances keyed by their workflow task id.
    pub(crate) active_workflows: HashMap<TaskId, WorkflowProgress>,
    /// The most recent message's unconsumed task suggestions.
    pub(crate) task_suggestions: Vec<TaskDraft>,
    /// The last computed analytics snapshot.
    pub(crate) analytics: Option<Analytics>,
    /// The primary backing agent provider.
    pub(crate) current_provider: AgentProvider,
    /// Whether cross-cutting intents trigger multi-agent consultation.
    pub(crate) multi_agent_enabled: bool,
    /// Wall-clock processing time per message, in milliseconds.
    pub(crate) response_times_ms: Vec<f64>,
}

impl SessionState {
    pub(crate) fn new(config: &CoordinatorConfig) -> Self {
        Self {
            coordinating: false,
            session_task_id: None,
            recognized_intents: Vec::new(),
            active_workflows: HashMap::new(),
            task_suggestions: Vec::new(),
            analytics: None,
            current_provider: config.default_provider,
            multi_agent_enabled: config.multi_agent_enabled,
            response_times_ms: Vec::new(),
        }
    }

    /// Reset everything back to the post-construction state.
    pub(crate) fn reset(&mut self, config: &CoordinatorConfig) {
        *self = Self::new(config);
    }
}

// ---------------------------------------------------------------------------
// Read-only status view
// ---------------------------------------------------------------------------

/// A point-in-time view of the session, returned by query methods instead
/// of exposing observable properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub is_coordinating: bool,
    pub session_task_id: Option<TaskId>,
    pub recognized_intent_count: usize,
    pub active_workflow_count: usize,
    pub multi_agent_enabled: bool,
    pub current_provider: AgentProvider,
}

// ---------------------------------------------------------------------------
// Session snapshot
// ---------------------------------------------------------------------------

/// A serializable image of the session: every registry task in creation
/// order plus the ordered recognized-intent log.  Round-trips without
/// dropping any field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Registry contents in creation order.
    pub tasks: Vec<Task>,
    /// Recognized intents in recognition order.
    pub intents: Vec<Intent>,
}

impl SessionSnapshot {
    /// Serialize the snapshot to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
