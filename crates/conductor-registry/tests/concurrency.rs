//! Concurrency tests for the task registry.
//!
//! The registry is the single shared mutable resource of the engine, so
//! these tests hammer it from many tokio tasks at once and assert that no
//! creation or update is lost or duplicated.

use std::collections::HashSet;

use conductor_registry::{
    TaskDraft, TaskLevel, TaskQuery, TaskRegistry, TaskStatus, TaskUpdate, tags,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_are_all_recorded() {
    let registry = TaskRegistry::new();

    let handles: Vec<_> = (0..64)
        .map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .create(
                        TaskDraft::new(format!("task {i}"), TaskLevel::Standard)
                            .with_tag(tags::AI_CREATED),
                    )
                    .expect("create should succeed")
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let task = handle.await.expect("spawned task panicked");
        ids.insert(task.id);
    }

    // No lost or duplicated entries.
    assert_eq!(ids.len(), 64);
    assert_eq!(registry.len(), 64);
    assert_eq!(
        registry.query(&TaskQuery::new().with_tag(tags::AI_CREATED)).len(),
        64
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_to_one_task_serialize() {
    let registry = TaskRegistry::new();
    let task = registry
        .create(TaskDraft::new("contended", TaskLevel::Standard))
        .expect("create");

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let registry = registry.clone();
            let id = task.id;
            tokio::spawn(async move {
                registry
                    .update(id, TaskUpdate::new().with_tag(format!("writer-{i}")))
                    .expect("update should succeed")
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("spawned task panicked");
    }

    // Every writer's tag landed: updates serialized, none dropped.
    let final_task = registry.get(task.id).expect("task exists");
    for i in 0..32 {
        assert!(final_task.has_tag(&format!("writer-{i}")));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parent_links_survive_concurrent_registration() {
    let registry = TaskRegistry::new();
    let parent = registry
        .create(TaskDraft::new("workflow", TaskLevel::CrossCutting))
        .expect("create parent");

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let registry = registry.clone();
            let parent_id = parent.id;
            tokio::spawn(async move {
                registry
                    .create(
                        TaskDraft::new(format!("step {i}"), TaskLevel::Elevated)
                            .with_parent(parent_id)
                            .with_tag(tags::WORKFLOW_STEP),
                    )
                    .expect("create step")
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("spawned task panicked");
    }

    let children = registry.subtasks(parent.id);
    assert_eq!(children.len(), 16);
    assert!(
        children
            .iter()
            .all(|c| c.parent_task_id == Some(parent.id) && c.status == TaskStatus::Pending)
    );
}
