//! Registry snapshot export and import.
//!
//! A [`RegistrySnapshot`] is an ordered, serde-serializable image of the
//! registry: every task field round-trips, and creation order is preserved
//! so that a restored registry iterates exactly like the original.

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::registry::TaskRegistry;
use crate::task::Task;

/// An ordered snapshot of every task in a registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Tasks in creation order.
    pub tasks: Vec<Task>,
}

impl RegistrySnapshot {
    /// Serialize the snapshot to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TaskRegistry {
    /// Export every task, in creation order.
    pub fn export(&self) -> RegistrySnapshot {
        let order = self.inner.order.read().unwrap();
        let tasks = order
            .iter()
            .filter_map(|id| self.inner.tasks.get(id))
            .map(|entry| entry.value().clone())
            .collect();
        RegistrySnapshot { tasks }
    }

    /// Replace the registry contents with the snapshot.
    ///
    /// Existing tasks are discarded.  Every task keeps its original id,
    /// timestamps, and parent link; a task whose parent is not present in
    /// the snapshot (in an earlier position) is rejected with
    /// [`RegistryError::ParentNotFound`], and duplicate ids with
    /// [`RegistryError::InvariantViolation`] -- in both cases the registry
    /// is left empty rather than half-restored.
    pub fn import(&self, snapshot: RegistrySnapshot) -> Result<()> {
        let mut order = self.inner.order.write().unwrap();
        order.clear();
        self.inner.tasks.clear();

        for task in snapshot.tasks {
            if self.inner.tasks.contains_key(&task.id) {
                order.clear();
                self.inner.tasks.clear();
                return Err(RegistryError::InvariantViolation {
                    reason: format!("duplicate task id in snapshot: {}", task.id),
                });
            }
            if let Some(parent_id) = task.parent_task_id
                && !self.inner.tasks.contains_key(&parent_id)
            {
                order.clear();
                self.inner.tasks.clear();
                return Err(RegistryError::ParentNotFound { parent_id });
            }
            order.push(task.id);
            self.inner.tasks.insert(task.id, task);
        }

        tracing::info!(restored = order.len(), "registry snapshot imported");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TaskQuery;
    use crate::task::{TaskDraft, TaskLevel, TaskPriority, TaskStatus, tags};

    #[test]
    fn export_import_roundtrip() {
        let registry = TaskRegistry::new();
        let parent = registry
            .create(
                TaskDraft::new("workflow", TaskLevel::CrossCutting)
                    .with_priority(TaskPriority::High)
                    .with_tag(tags::AUTOMATED_WORKFLOW)
                    .with_metadata("document_analysis_workflow"),
            )
            .unwrap();
        registry
            .create(
                TaskDraft::new("step", TaskLevel::Elevated)
                    .with_parent(parent.id)
                    .with_tag(tags::WORKFLOW_STEP)
                    .with_status(TaskStatus::InProgress),
            )
            .unwrap();

        let json = registry.export().to_json().unwrap();

        let restored = TaskRegistry::new();
        restored
            .import(RegistrySnapshot::from_json(&json).unwrap())
            .unwrap();

        assert_eq!(restored.len(), 2);
        let all = restored.query(&TaskQuery::new());
        assert_eq!(all[0].id, parent.id);
        assert_eq!(all[0].level, TaskLevel::CrossCutting);
        assert!(all[0].has_tag(tags::AUTOMATED_WORKFLOW));
        assert_eq!(all[1].parent_task_id, Some(parent.id));
        assert_eq!(all[1].status, TaskStatus::InProgress);

        let children = restored.subtasks(parent.id);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].title, "step");
    }

    #[test]
    fn import_rejects_dangling_parent() {
        let source = TaskRegistry::new();
        let parent = source
            .create(TaskDraft::new("p", TaskLevel::Standard))
            .unwrap();
        source
            .create(TaskDraft::new("c", TaskLevel::Standard).with_parent(parent.id))
            .unwrap();

        let mut snapshot = source.export();
        // Drop the parent so the child's link dangles.
        snapshot.tasks.remove(0);

        let target = TaskRegistry::new();
        let result = target.import(snapshot);
        assert!(matches!(result, Err(RegistryError::ParentNotFound { .. })));
        assert!(target.is_empty());
    }
}
