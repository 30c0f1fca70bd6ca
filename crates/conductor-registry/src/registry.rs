//! Concurrent task registry.
//!
//! The registry owns every task record in the engine.  It is backed by
//! [`DashMap`], which gives lock-free concurrent reads and fine-grained
//! per-entry write locking, plus a separate insertion-order list so that
//! queries iterate in creation order.
//!
//! Mutations are serialized: `create` and `clear_all` run under the order
//! lock, and `update` goes through the map's per-entry lock, so concurrent
//! callers never observe a half-applied change.  Every mutation publishes a
//! [`ChangeEvent`](crate::events::ChangeEvent) on the attached bus.
//!
//! # Example
//!
//! ```rust
//! # use conductor_registry::{TaskDraft, TaskLevel, TaskRegistry, TaskStatus, TaskUpdate};
//! let registry = TaskRegistry::new();
//! let task = registry
//!     .create(TaskDraft::new("Summarize minutes", TaskLevel::Standard))
//!     .unwrap();
//!
//! registry
//!     .update(task.id, TaskUpdate::new().with_status(TaskStatus::InProgress))
//!     .unwrap();
//! assert_eq!(registry.get(task.id).unwrap().status, TaskStatus::InProgress);
//! ```

use std::sync::{Arc, RwLock};

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{RegistryError, Result};
use crate::events::{ChangeEvent, EventBus};
use crate::task::{Task, TaskDraft, TaskId, TaskLevel, TaskPriority, TaskStatus};

// ---------------------------------------------------------------------------
// Mutation builder
// ---------------------------------------------------------------------------

/// A partial mutation applied atomically to a registered task.
///
/// Only fields that are explicitly set are changed; `id`, `parent_task_id`,
/// and `created_at` are never mutable through an update, which keeps the
/// parent-link invariant intact after registration.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    title: Option<String>,
    description: Option<String>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    metadata: Option<String>,
    added_tags: Vec<String>,
}

impl TaskUpdate {
    /// Create an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replace the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Transition to a new status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Change the priority.
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replace the metadata payload.
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    /// Add a tag to the task's tag set.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.added_tags.push(tag.into());
        self
    }

    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(metadata) = self.metadata {
            task.metadata = metadata;
        }
        task.tags.extend(self.added_tags);
    }
}

// ---------------------------------------------------------------------------
// Query filter
// ---------------------------------------------------------------------------

/// A conjunction of optional task filters.
///
/// An unset field matches everything; set fields must all match.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    level: Option<TaskLevel>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    tag: Option<String>,
}

impl TaskQuery {
    /// Create a filter that matches every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match only tasks at the given level.
    pub fn with_level(mut self, level: TaskLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Match only tasks in the given status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Match only tasks at the given priority.
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Match only tasks carrying the given tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Whether the given task satisfies every set filter.
    pub fn matches(&self, task: &Task) -> bool {
        self.level.is_none_or(|level| task.level == level)
            && self.status.is_none_or(|status| task.status == status)
            && self
                .priority
                .is_none_or(|priority| task.priority == priority)
            && self.tag.as_deref().is_none_or(|tag| task.has_tag(tag))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Concurrent task registry.
///
/// The registry is cheaply cloneable (`Arc`-backed) and `Send + Sync`; all
/// operations are in-memory and non-blocking, so none of them should be
/// held across an await point by callers.
#[derive(Clone)]
pub struct TaskRegistry {
    pub(crate) inner: Arc<RegistryInner>,
}

pub(crate) struct RegistryInner {
    /// Authoritative task records.
    pub(crate) tasks: DashMap<TaskId, Task>,
    /// Task ids in creation order; guards structural mutations.
    pub(crate) order: RwLock<Vec<TaskId>>,
    /// Change-event sink.
    pub(crate) bus: EventBus,
}

impl TaskRegistry {
    /// Create an empty registry with its own event bus.
    #[must_use]
    pub fn new() -> Self {
        Self::with_events(EventBus::default())
    }

    /// Create an empty registry publishing to the given bus.
    ///
    /// Sharing a bus lets the coordinator interleave session events with
    /// task events on a single subscription.
    #[must_use]
    pub fn with_events(bus: EventBus) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                tasks: DashMap::new(),
                order: RwLock::new(Vec::new()),
                bus,
            }),
        }
    }

    /// The bus this registry publishes change events to.
    pub fn events(&self) -> &EventBus {
        &self.inner.bus
    }

    /// Register a draft, assigning a fresh id and creation timestamp.
    ///
    /// Fails with [`RegistryError::ParentNotFound`] if the draft names a
    /// parent that is not currently registered.
    pub fn create(&self, draft: TaskDraft) -> Result<Task> {
        // The order lock serializes structural changes, so the parent check
        // and the insert are a single atomic step with respect to other
        // creates and clears.
        let mut order = self.inner.order.write().unwrap();

        if let Some(parent_id) = draft.parent_task_id
            && !self.inner.tasks.contains_key(&parent_id)
        {
            return Err(RegistryError::ParentNotFound { parent_id });
        }

        let task = Task {
            id: Uuid::now_v7(),
            title: draft.title,
            description: draft.description,
            level: draft.level,
            priority: draft.priority,
            status: draft.status,
            tags: draft.tags,
            metadata: draft.metadata,
            parent_task_id: draft.parent_task_id,
            required_capabilities: draft.required_capabilities,
            created_at: Utc::now(),
        };

        order.push(task.id);
        self.inner.tasks.insert(task.id, task.clone());
        drop(order);

        tracing::debug!(
            task_id = %task.id,
            title = %task.title,
            level = %task.level,
            "task registered"
        );

        self.inner.bus.publish(ChangeEvent::TaskCreated {
            task_id: task.id,
            title: task.title.clone(),
            timestamp: task.created_at,
        });

        Ok(task)
    }

    /// Retrieve a snapshot of a task.
    pub fn get(&self, id: TaskId) -> Result<Task> {
        self.inner
            .tasks
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(RegistryError::TaskNotFound { task_id: id })
    }

    /// Apply a mutation atomically and return the updated task.
    ///
    /// Concurrent updates to the same id are serialized through the map's
    /// per-entry lock; the last writer wins.
    pub fn update(&self, id: TaskId, update: TaskUpdate) -> Result<Task> {
        let updated = {
            let mut entry = self
                .inner
                .tasks
                .get_mut(&id)
                .ok_or(RegistryError::TaskNotFound { task_id: id })?;
            update.apply(entry.value_mut());
            entry.value().clone()
        };

        tracing::debug!(
            task_id = %id,
            status = ?updated.status,
            "task updated"
        );

        self.inner.bus.publish(ChangeEvent::TaskUpdated {
            task_id: id,
            status: format!("{:?}", updated.status),
            timestamp: Utc::now(),
        });

        Ok(updated)
    }

    /// Return every task matching the filter, in creation order.
    pub fn query(&self, query: &TaskQuery) -> Vec<Task> {
        let order = self.inner.order.read().unwrap();
        order
            .iter()
            .filter_map(|id| self.inner.tasks.get(id))
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Return the direct children of `parent`, in creation order.
    ///
    /// The parent itself need not exist: orphaned children remain
    /// observable after their parent is gone.
    pub fn subtasks(&self, parent: TaskId) -> Vec<Task> {
        let order = self.inner.order.read().unwrap();
        order
            .iter()
            .filter_map(|id| self.inner.tasks.get(id))
            .filter(|entry| entry.value().parent_task_id == Some(parent))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Remove every task.  Administrative reset only.
    pub fn clear_all(&self) {
        let mut order = self.inner.order.write().unwrap();
        let removed = order.len();
        order.clear();
        self.inner.tasks.clear();
        drop(order);

        tracing::info!(removed, "registry cleared");

        self.inner.bus.publish(ChangeEvent::RegistryCleared {
            timestamp: Utc::now(),
        });
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.inner.tasks.len()
    }

    /// Whether the registry holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.inner.tasks.is_empty()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
