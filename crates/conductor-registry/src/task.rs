//! Task data model.
//!
//! A [`Task`] is the unit of work tracked by the registry: a titled record
//! with a complexity level, a scheduling priority, a lifecycle status, a set
//! of free-form tags, and an optional parent link forming a hierarchy.
//! Unregistered task templates are expressed as [`TaskDraft`]s; the registry
//! assigns the id and creation timestamp at registration time.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RegistryError, Result};

/// Unique, time-ordered task identifier (UUID v7).
pub type TaskId = Uuid;

// ---------------------------------------------------------------------------
// Well-known tags
// ---------------------------------------------------------------------------

/// Tags used by core routing and filtering decisions.
///
/// Tasks carry free-form string tags, but every tag the engine itself keys
/// on is declared here so that typos in core logic fail to compile instead
/// of silently missing a filter.
pub mod tags {
    /// Task was created from a classified intent rather than by hand.
    pub const AI_CREATED: &str = "ai-created";
    /// Task originated from a conversational message.
    pub const FROM_CHAT: &str = "from-chat";
    /// Task is one step of an automated workflow.
    pub const WORKFLOW_STEP: &str = "workflow-step";
    /// Task is the owning record of an automated workflow instance.
    pub const AUTOMATED_WORKFLOW: &str = "automated-workflow";
    /// Task records a multi-provider agent consultation.
    pub const MULTI_LLM: &str = "multi-llm";
    /// Task belongs to the coordination bookkeeping chain.
    pub const COORDINATION: &str = "coordination";
    /// Task was created by the coordination engine itself.
    pub const AI_COORDINATION: &str = "ai-coordination";
    /// Task tracks the processing of a single incoming message.
    pub const MESSAGE_PROCESSING: &str = "message-processing";
    /// Task is the per-session anchor record.
    pub const SESSION: &str = "session";
    /// Task sits at the cross-cutting complexity tier.
    pub const LEVEL6: &str = "level6";
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Complexity tier of a task, ordinal 1–6.
///
/// Higher tiers denote broader, more cross-cutting coordination work:
/// session and workflow bookkeeping sits at [`TaskLevel::CrossCutting`],
/// analysis subtasks at [`TaskLevel::Complex`], and workflow steps below
/// the workflow that owns them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskLevel {
    /// Tier 1 -- mechanical one-shot work.
    Trivial = 1,
    /// Tier 2 -- simple, single-capability work.
    Basic = 2,
    /// Tier 3 -- ordinary standalone tasks.
    Standard = 3,
    /// Tier 4 -- multi-part work such as workflow steps.
    Elevated = 4,
    /// Tier 5 -- analysis work spanning several inputs.
    Complex = 5,
    /// Tier 6 -- cross-cutting, session-level coordination.
    CrossCutting = 6,
}

impl TaskLevel {
    /// The ordinal value of this tier (1–6).
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Build a level from its ordinal value.
    ///
    /// Values outside 1–6 are rejected with
    /// [`RegistryError::InvariantViolation`].
    pub fn from_value(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Trivial),
            2 => Ok(Self::Basic),
            3 => Ok(Self::Standard),
            4 => Ok(Self::Elevated),
            5 => Ok(Self::Complex),
            6 => Ok(Self::CrossCutting),
            other => Err(RegistryError::InvariantViolation {
                reason: format!("task level must be 1–6, got {other}"),
            }),
        }
    }
}

impl std::fmt::Display for TaskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Scheduling priority of a task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Background / best-effort.
    Low,
    /// Default priority for most work.
    Normal,
    /// Important but not safety-critical.
    High,
    /// Must be acted on before anything else.
    Critical,
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created but not yet started.
    Pending,
    /// Actively being worked on.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Abandoned before completion.
    Cancelled,
}

impl TaskStatus {
    /// Whether the task has reached a final state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A registered task record.
///
/// Owned by the registry; `id` and `created_at` are immutable once assigned.
/// A non-null `parent_task_id` referenced an existing task at registration
/// time, but parents may be cleared later -- orphaned children remain
/// observable through subtask queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned by the registry.
    pub id: TaskId,
    /// Short human-readable title.
    pub title: String,
    /// Longer description of the work.
    pub description: String,
    /// Complexity tier.
    pub level: TaskLevel,
    /// Scheduling priority.
    pub priority: TaskPriority,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Free-form tags; membership tests only, order is irrelevant.
    pub tags: BTreeSet<String>,
    /// Free-form metadata, e.g. the originating message.
    pub metadata: String,
    /// Optional link to a parent task.  Ownership stays with the registry.
    pub parent_task_id: Option<TaskId>,
    /// Capabilities a worker must have to execute this task.
    pub required_capabilities: BTreeSet<String>,
    /// When the registry accepted this task.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Whether the task carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

// ---------------------------------------------------------------------------
// TaskDraft
// ---------------------------------------------------------------------------

/// An unregistered task template.
///
/// Drafts are produced by the intent classifier and the workflow engine and
/// handed to [`TaskRegistry::create`](crate::registry::TaskRegistry::create),
/// which assigns the id and creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub level: TaskLevel,
    pub priority: TaskPriority,
    /// Initial status; defaults to [`TaskStatus::Pending`].
    pub status: TaskStatus,
    pub tags: BTreeSet<String>,
    pub metadata: String,
    pub parent_task_id: Option<TaskId>,
    pub required_capabilities: BTreeSet<String>,
}

impl TaskDraft {
    /// Create a draft with the given title and level; everything else takes
    /// its default.
    pub fn new(title: impl Into<String>, level: TaskLevel) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            level,
            priority: TaskPriority::Normal,
            status: TaskStatus::Pending,
            tags: BTreeSet::new(),
            metadata: String::new(),
            parent_task_id: None,
            required_capabilities: BTreeSet::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the initial status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Add a single tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add several tags at once.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set the metadata payload.
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Link this draft to a parent task.
    pub fn with_parent(mut self, parent: TaskId) -> Self {
        self.parent_task_id = Some(parent);
        self
    }

    /// Require a worker capability.
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.required_capabilities.insert(capability.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering_follows_ordinals() {
        assert!(TaskLevel::Trivial < TaskLevel::CrossCutting);
        assert!(TaskLevel::Elevated < TaskLevel::Complex);
        assert_eq!(TaskLevel::CrossCutting.value(), 6);
        assert_eq!(TaskLevel::Trivial.value(), 1);
    }

    #[test]
    fn level_from_value_bounds() {
        assert_eq!(TaskLevel::from_value(5).unwrap(), TaskLevel::Complex);
        assert!(TaskLevel::from_value(0).is_err());
        assert!(TaskLevel::from_value(7).is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
    }

    #[test]
    fn draft_builder() {
        let draft = TaskDraft::new("Review quarterly numbers", TaskLevel::Complex)
            .with_description("Go through the Q4 figures")
            .with_priority(TaskPriority::High)
            .with_tag(tags::AI_CREATED)
            .with_tags([tags::FROM_CHAT])
            .with_metadata("analyze the numbers")
            .with_capability("analysis");

        assert_eq!(draft.level, TaskLevel::Complex);
        assert_eq!(draft.priority, TaskPriority::High);
        assert_eq!(draft.status, TaskStatus::Pending);
        assert!(draft.tags.contains(tags::AI_CREATED));
        assert!(draft.tags.contains(tags::FROM_CHAT));
        assert!(draft.required_capabilities.contains("analysis"));
    }

    #[test]
    fn task_serialization_roundtrip() {
        let task = Task {
            id: Uuid::now_v7(),
            title: "Export report".into(),
            description: "Render and export the report".into(),
            level: TaskLevel::CrossCutting,
            priority: TaskPriority::Critical,
            status: TaskStatus::InProgress,
            tags: [tags::AI_CREATED.to_string(), tags::LEVEL6.to_string()]
                .into_iter()
                .collect(),
            metadata: "generate the report".into(),
            parent_task_id: Some(Uuid::now_v7()),
            required_capabilities: ["export".to_string()].into_iter().collect(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, task.id);
        assert_eq!(parsed.level, task.level);
        assert_eq!(parsed.status, task.status);
        assert_eq!(parsed.tags, task.tags);
        assert_eq!(parsed.parent_task_id, task.parent_task_id);
        assert_eq!(parsed.required_capabilities, task.required_capabilities);
    }
}
