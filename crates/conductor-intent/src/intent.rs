//! Structured intent model.
//!
//! An [`Intent`] is the ephemeral result of classifying one user message:
//! what the user wants ([`IntentKind`]), how sure the classifier is, which
//! entities were extracted, which task templates should be materialized, and
//! which workflow templates the request calls for.  Intents are produced
//! fresh per message and appended to the session log, never mutated.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use conductor_registry::{TaskDraft, TaskLevel};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The classified purpose of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum IntentKind {
    /// Low-signal or unclassifiable input; the safe fallback.
    General,
    /// The user wants a document analyzed.
    AnalyzeDocument,
    /// The user wants a report generated.
    GenerateReport,
    /// The user wants a multi-step workflow automated.
    AutomateWorkflow,
    /// The user is explicitly asking for tasks to be created.
    CreateTask,
}

impl IntentKind {
    /// The complexity tier this kind of request sits at.
    ///
    /// Cross-cutting kinds are the ones eligible for multi-agent
    /// consultation.
    pub const fn complexity(self) -> TaskLevel {
        match self {
            Self::AutomateWorkflow | Self::GenerateReport => TaskLevel::CrossCutting,
            Self::AnalyzeDocument => TaskLevel::Complex,
            Self::CreateTask => TaskLevel::Standard,
            Self::General => TaskLevel::Basic,
        }
    }
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::General => "general",
            Self::AnalyzeDocument => "analyze-document",
            Self::GenerateReport => "generate-report",
            Self::AutomateWorkflow => "automate-workflow",
            Self::CreateTask => "create-task",
        };
        write!(f, "{s}")
    }
}

/// A classified user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// What the message asks for.
    pub kind: IntentKind,
    /// Classifier confidence, always within `[0.0, 1.0]`.
    pub confidence: f64,
    /// Extracted entities, at most one value per entity kind
    /// (e.g. `"file"`, `"number"`).
    pub entities: HashMap<String, String>,
    /// Task templates suggested for this message, in suggestion order.
    /// Not yet registered.
    pub suggested_tasks: Vec<TaskDraft>,
    /// Workflow template identifiers this request calls for; empty for
    /// general intents.
    pub required_workflows: BTreeSet<String>,
    /// The raw message that produced this intent.
    pub source_message: String,
}

impl Intent {
    /// The complexity tier of this intent.
    pub fn complexity(&self) -> TaskLevel {
        self.kind.complexity()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_tiers() {
        assert_eq!(
            IntentKind::AutomateWorkflow.complexity(),
            TaskLevel::CrossCutting
        );
        assert_eq!(
            IntentKind::GenerateReport.complexity(),
            TaskLevel::CrossCutting
        );
        assert_eq!(IntentKind::AnalyzeDocument.complexity(), TaskLevel::Complex);
        assert_eq!(IntentKind::CreateTask.complexity(), TaskLevel::Standard);
        assert_eq!(IntentKind::General.complexity(), TaskLevel::Basic);
    }

    #[test]
    fn intent_serialization_roundtrip() {
        let intent = Intent {
            kind: IntentKind::AnalyzeDocument,
            confidence: 0.85,
            entities: [("file".to_string(), "@report.pdf".to_string())]
                .into_iter()
                .collect(),
            suggested_tasks: vec![TaskDraft::new("Document Analysis", TaskLevel::Complex)],
            required_workflows: BTreeSet::new(),
            source_message: "Analyze document @report.pdf".into(),
        };

        let json = serde_json::to_string(&intent).unwrap();
        let parsed: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.kind, IntentKind::AnalyzeDocument);
        assert_eq!(parsed.entities.get("file").map(String::as_str), Some("@report.pdf"));
        assert_eq!(parsed.suggested_tasks.len(), 1);
    }
}
