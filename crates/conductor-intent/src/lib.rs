//! Intent classification and workflow expansion for Conductor.
//!
//! This crate provides:
//!
//! - **Intent model**: [`Intent`] and [`IntentKind`] -- the classified
//!   purpose of a user message with confidence, entities, and suggested
//!   task templates.
//! - **Classifier**: Ordered keyword rules plus phrase detection via
//!   [`classifier::IntentClassifier`]; never fails, unmatched input
//!   degrades to a general intent.
//! - **Workflow engine**: Closed template catalog expanded into
//!   parent-linked step task hierarchies via [`workflow::WorkflowEngine`].

pub mod classifier;
pub mod error;
pub mod intent;
pub mod workflow;

pub use classifier::{Classifier, IntentClassifier};
pub use error::{IntentError, Result};
pub use intent::{Intent, IntentKind};
pub use workflow::{
    DOCUMENT_ANALYSIS_WORKFLOW, REPORT_GENERATION_WORKFLOW, WorkflowEngine, WorkflowProgress,
};
