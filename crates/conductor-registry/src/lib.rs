//! Hierarchical task registry for the Conductor orchestration engine.
//!
//! This crate provides:
//!
//! - **[`task`]** -- The task data model: levels, priorities, statuses,
//!   well-known tags, and the [`TaskDraft`] template builder.
//! - **[`registry`]** -- [`DashMap`](dashmap::DashMap)-backed concurrent
//!   [`TaskRegistry`] with creation-order queries and atomic updates.
//! - **[`events`]** -- Broadcast [`EventBus`] publishing a change event on
//!   every task mutation and session transition.
//! - **[`export`]** -- Ordered, lossless snapshot export/import.
//! - **[`error`]** -- Unified registry error types via [`thiserror`].
//!
//! All public types are `Send + Sync` and designed for use within a
//! multi-threaded tokio runtime.

pub mod error;
pub mod events;
pub mod export;
pub mod registry;
pub mod task;

// Re-export the most commonly used types at the crate root for convenience.
pub use error::{RegistryError, Result};
pub use events::{ChangeEvent, DEFAULT_EVENT_CAPACITY, EventBus};
pub use export::RegistrySnapshot;
pub use registry::{TaskQuery, TaskRegistry, TaskUpdate};
pub use task::{Task, TaskDraft, TaskId, TaskLevel, TaskPriority, TaskStatus, tags};
