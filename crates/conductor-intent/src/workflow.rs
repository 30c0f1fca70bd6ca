//! Workflow expansion engine.
//!
//! A workflow template is a fixed, ordered list of step definitions from a
//! small closed catalog.  Expanding a template registers one owning workflow
//! task plus its step tasks in sequence order; the steps' creation order is
//! their execution order, and every step is parent-linked to the workflow
//! task.
//!
//! Expanding the same template twice creates two independent instances;
//! there is no deduplication.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use conductor_registry::{
    Task, TaskDraft, TaskId, TaskLevel, TaskPriority, TaskRegistry, TaskStatus, TaskUpdate, tags,
};

use crate::error::{IntentError, Result};

// ---------------------------------------------------------------------------
// Template catalog
// ---------------------------------------------------------------------------

/// Template identifier for the document-analysis workflow.
pub const DOCUMENT_ANALYSIS_WORKFLOW: &str = "document_analysis_workflow";

/// Template identifier for the report-generation workflow.
pub const REPORT_GENERATION_WORKFLOW: &str = "report_generation_workflow";

/// One step in a workflow template.
struct StepTemplate {
    title: &'static str,
    description: &'static str,
    capability: &'static str,
}

/// A complete workflow template.
struct WorkflowTemplate {
    id: &'static str,
    label: &'static str,
    steps: &'static [StepTemplate],
}

/// The closed template catalog.
const CATALOG: &[WorkflowTemplate] = &[
    WorkflowTemplate {
        id: DOCUMENT_ANALYSIS_WORKFLOW,
        label: "Document Analysis",
        steps: &[
            StepTemplate {
                title: "Extract text",
                description: "Extract raw text from the source documents",
                capability: "extraction",
            },
            StepTemplate {
                title: "Classify content",
                description: "Classify the extracted content by type and topic",
                capability: "classification",
            },
            StepTemplate {
                title: "Summarize findings",
                description: "Summarize the key findings across the content",
                capability: "analysis",
            },
            StepTemplate {
                title: "Export results",
                description: "Export the analysis results for delivery",
                capability: "export",
            },
        ],
    },
    WorkflowTemplate {
        id: REPORT_GENERATION_WORKFLOW,
        label: "Report Generation",
        steps: &[
            StepTemplate {
                title: "Collect source data",
                description: "Gather the data sources the report draws on",
                capability: "data-collection",
            },
            StepTemplate {
                title: "Aggregate metrics",
                description: "Aggregate the collected data into report metrics",
                capability: "aggregation",
            },
            StepTemplate {
                title: "Render report",
                description: "Render the aggregated metrics into the report body",
                capability: "rendering",
            },
            StepTemplate {
                title: "Export report",
                description: "Export the rendered report for delivery",
                capability: "export",
            },
        ],
    },
];

// ---------------------------------------------------------------------------
// Workflow progress
// ---------------------------------------------------------------------------

/// A registered workflow instance.
///
/// Every step's `parent_task_id` equals `workflow_task_id`, and
/// `step_task_ids` is both creation and execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowProgress {
    /// The owning workflow task.
    pub workflow_task_id: TaskId,
    /// The template this instance was expanded from.
    pub template: String,
    /// Step task ids in execution order.
    pub step_task_ids: Vec<TaskId>,
}

impl WorkflowProgress {
    /// Number of steps in this instance.
    pub fn step_count(&self) -> usize {
        self.step_task_ids.len()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Expands workflow templates into registered task hierarchies.
pub struct WorkflowEngine;

impl WorkflowEngine {
    /// Create a new workflow engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// The template identifiers this engine knows about.
    pub fn known_templates(&self) -> Vec<&'static str> {
        CATALOG.iter().map(|t| t.id).collect()
    }

    /// Expand a template into a workflow task plus ordered step tasks.
    ///
    /// The workflow task is registered first (cross-cutting level, high
    /// priority, tagged `automated-workflow`, metadata set to the template
    /// id), then each step in sequence order (tagged `workflow-step`,
    /// parent-linked, one tier below the workflow).  Unknown template ids
    /// fail with [`IntentError::UnknownWorkflowTemplate`] before anything
    /// is registered.
    pub fn expand(
        &self,
        template_id: &str,
        source_message: &str,
        registry: &TaskRegistry,
    ) -> Result<WorkflowProgress> {
        let template = CATALOG
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| IntentError::UnknownWorkflowTemplate {
                template: template_id.to_string(),
            })?;

        let workflow_task = registry.create(
            TaskDraft::new(
                format!("Automated Workflow: {}", template.label),
                TaskLevel::CrossCutting,
            )
            .with_description(source_message)
            .with_priority(TaskPriority::High)
            .with_status(TaskStatus::InProgress)
            .with_tag(tags::AUTOMATED_WORKFLOW)
            .with_metadata(template.id),
        )?;

        let mut step_task_ids = Vec::with_capacity(template.steps.len());
        for step in template.steps {
            let task = registry.create(
                TaskDraft::new(step.title, TaskLevel::Elevated)
                    .with_description(step.description)
                    .with_parent(workflow_task.id)
                    .with_tag(tags::WORKFLOW_STEP)
                    .with_capability(step.capability)
                    .with_metadata(template.id),
            )?;
            step_task_ids.push(task.id);
        }

        info!(
            workflow_id = %workflow_task.id,
            template = template.id,
            steps = step_task_ids.len(),
            "workflow expanded"
        );

        Ok(WorkflowProgress {
            workflow_task_id: workflow_task.id,
            template: template.id.to_string(),
            step_task_ids,
        })
    }

    /// Mark one step completed; completes the workflow task once every step
    /// is done.
    pub fn complete_step(
        &self,
        registry: &TaskRegistry,
        progress: &WorkflowProgress,
        index: usize,
    ) -> Result<Task> {
        let step_id = *progress.step_task_ids.get(index).ok_or(
            IntentError::StepOutOfRange {
                index,
                count: progress.step_task_ids.len(),
            },
        )?;

        let step = registry.update(
            step_id,
            TaskUpdate::new().with_status(TaskStatus::Completed),
        )?;

        let all_done = progress.step_task_ids.iter().all(|id| {
            registry
                .get(*id)
                .map(|t| t.status == TaskStatus::Completed)
                .unwrap_or(false)
        });

        if all_done {
            registry.update(
                progress.workflow_task_id,
                TaskUpdate::new().with_status(TaskStatus::Completed),
            )?;
            info!(
                workflow_id = %progress.workflow_task_id,
                template = %progress.template,
                "workflow completed"
            );
        } else {
            debug!(
                workflow_id = %progress.workflow_task_id,
                step = index,
                "workflow step completed"
            );
        }

        Ok(step)
    }
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_document_analysis() {
        let registry = TaskRegistry::new();
        let engine = WorkflowEngine::new();

        let progress = engine
            .expand(DOCUMENT_ANALYSIS_WORKFLOW, "analyze everything", &registry)
            .expect("expand");

        assert_eq!(progress.step_count(), 4);
        assert_eq!(progress.template, DOCUMENT_ANALYSIS_WORKFLOW);

        let workflow = registry.get(progress.workflow_task_id).expect("workflow");
        assert!(workflow.title.contains("Automated Workflow"));
        assert_eq!(workflow.level, TaskLevel::CrossCutting);
        assert_eq!(workflow.priority, TaskPriority::High);
        assert_eq!(workflow.metadata, DOCUMENT_ANALYSIS_WORKFLOW);
        assert!(workflow.has_tag(tags::AUTOMATED_WORKFLOW));

        let steps = registry.subtasks(progress.workflow_task_id);
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].title, "Extract text");
        assert_eq!(steps[3].title, "Export results");
        for step in &steps {
            assert!(step.has_tag(tags::WORKFLOW_STEP));
            assert!(step.level <= workflow.level);
            assert_eq!(step.parent_task_id, Some(workflow.id));
        }
    }

    #[test]
    fn unknown_template_is_rejected() {
        let registry = TaskRegistry::new();
        let engine = WorkflowEngine::new();

        let result = engine.expand("nightly_backup_workflow", "back it up", &registry);
        assert!(matches!(
            result,
            Err(IntentError::UnknownWorkflowTemplate { .. })
        ));
        // Nothing was registered.
        assert!(registry.is_empty());
    }

    #[test]
    fn repeated_expansion_creates_independent_instances() {
        let registry = TaskRegistry::new();
        let engine = WorkflowEngine::new();

        let first = engine
            .expand(REPORT_GENERATION_WORKFLOW, "run it", &registry)
            .expect("first");
        let second = engine
            .expand(REPORT_GENERATION_WORKFLOW, "run it", &registry)
            .expect("second");

        assert_ne!(first.workflow_task_id, second.workflow_task_id);
        assert_eq!(registry.len(), 10); // 2 workflows + 8 steps
    }

    #[test]
    fn completing_every_step_completes_the_workflow() {
        let registry = TaskRegistry::new();
        let engine = WorkflowEngine::new();
        let progress = engine
            .expand(DOCUMENT_ANALYSIS_WORKFLOW, "analyze", &registry)
            .expect("expand");

        for index in 0..progress.step_count() {
            let before = registry.get(progress.workflow_task_id).unwrap();
            if index < progress.step_count() - 1 {
                assert_ne!(before.status, TaskStatus::Completed);
            }
            engine
                .complete_step(&registry, &progress, index)
                .expect("complete step");
        }

        let workflow = registry.get(progress.workflow_task_id).unwrap();
        assert_eq!(workflow.status, TaskStatus::Completed);
    }

    #[test]
    fn step_index_out_of_range() {
        let registry = TaskRegistry::new();
        let engine = WorkflowEngine::new();
        let progress = engine
            .expand(DOCUMENT_ANALYSIS_WORKFLOW, "analyze", &registry)
            .expect("expand");

        let result = engine.complete_step(&registry, &progress, 99);
        assert!(matches!(result, Err(IntentError::StepOutOfRange { .. })));
    }
}
