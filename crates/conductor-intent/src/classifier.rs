//! Heuristic intent classifier.
//!
//! The classifier maps a raw message to an [`Intent`] using an ordered
//! keyword rule table: the first rule whose keywords all appear in the
//! lowercased message wins, and anything unmatched degrades to a
//! low-confidence general intent.  Classification never fails -- empty
//! input still yields an intent with one generic task suggestion.
//!
//! Entity extraction runs independently of the matched kind, and a small
//! [`AhoCorasick`] automaton detects workflow-indicating phrases that
//! upgrade analysis/report requests to full workflow automation.
//!
//! A model-backed classifier can stand in for the rule set behind the
//! [`Classifier`] trait.

use std::collections::{BTreeSet, HashMap};

use aho_corasick::AhoCorasick;
use tracing::{debug, warn};

use conductor_registry::{TaskDraft, TaskLevel, TaskPriority, tags};

use crate::intent::{Intent, IntentKind};
use crate::workflow::{DOCUMENT_ANALYSIS_WORKFLOW, REPORT_GENERATION_WORKFLOW};

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// A keyword rule: every keyword must appear in the lowercased message.
struct Rule {
    kind: IntentKind,
    keywords: &'static [&'static str],
    confidence: f64,
}

/// Rules in priority order; the first full match wins.
const RULES: &[Rule] = &[
    Rule {
        kind: IntentKind::AutomateWorkflow,
        keywords: &["automate", "workflow"],
        confidence: 0.9,
    },
    Rule {
        kind: IntentKind::GenerateReport,
        keywords: &["generate", "report"],
        confidence: 0.85,
    },
    Rule {
        kind: IntentKind::AnalyzeDocument,
        keywords: &["analyze", "document"],
        confidence: 0.85,
    },
    Rule {
        kind: IntentKind::CreateTask,
        keywords: &["create", "task"],
        confidence: 0.8,
    },
];

/// Confidence assigned when no rule matches.
const GENERAL_CONFIDENCE: f64 = 0.4;

/// Confidence assigned to blank input.
const EMPTY_CONFIDENCE: f64 = 0.35;

/// Message length (in characters) beyond which generic task text is
/// truncated with an ellipsis.
const METADATA_LIMIT: usize = 100;

/// Title length cap for generic tasks derived from the message itself.
const TITLE_LIMIT: usize = 60;

/// Phrases that indicate the user wants full workflow automation even when
/// the primary intent is analysis or reporting.
const WORKFLOW_PHRASES: &[&str] = &[
    "using automated workflow",
    "automated workflow",
    "multiple documents",
    "processing workflow",
];

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// The classification seam.
///
/// The built-in [`IntentClassifier`] is heuristic; a model-backed
/// implementation can replace it behind this trait without touching the
/// coordinator.  Implementations must be infallible -- degrade to a
/// low-confidence general intent rather than erroring.
pub trait Classifier: Send + Sync {
    /// Classify a message into an [`Intent`].
    fn classify(&self, message: &str) -> Intent;
}

/// Keyword/phrase-based intent classifier.
pub struct IntentClassifier {
    /// Compiled workflow-phrase automaton.  `None` only if the build failed,
    /// in which case matching falls back to plain substring scans.
    workflow_phrases: Option<AhoCorasick>,
}

impl IntentClassifier {
    /// Create a classifier with the built-in rule set.
    #[must_use]
    pub fn new() -> Self {
        let workflow_phrases = match AhoCorasick::new(WORKFLOW_PHRASES) {
            Ok(ac) => Some(ac),
            Err(e) => {
                warn!(error = %e, "failed to build workflow phrase automaton");
                None
            }
        };
        Self { workflow_phrases }
    }

    /// Classify a message.  Never fails; the worst case is a low-confidence
    /// general intent with a single generic task suggestion.
    pub fn classify(&self, message: &str) -> Intent {
        let trimmed = message.trim();
        let lowered = trimmed.to_lowercase();

        let (kind, confidence) = if trimmed.is_empty() {
            (IntentKind::General, EMPTY_CONFIDENCE)
        } else {
            RULES
                .iter()
                .find(|rule| rule.keywords.iter().all(|kw| lowered.contains(kw)))
                .map(|rule| (rule.kind, rule.confidence))
                .unwrap_or((IntentKind::General, GENERAL_CONFIDENCE))
        };

        let entities = extract_entities(trimmed);
        let required_workflows = self.required_workflows(kind, &lowered);
        let suggested_tasks = suggest_tasks(kind, trimmed, &entities);

        debug!(
            kind = %kind,
            confidence,
            entities = entities.len(),
            workflows = required_workflows.len(),
            "message classified"
        );

        Intent {
            kind,
            confidence,
            entities,
            suggested_tasks,
            required_workflows,
            source_message: message.to_string(),
        }
    }

    // -- Private helpers ----------------------------------------------------

    /// Whether the lowercased message contains a workflow-indicating phrase.
    fn mentions_workflow(&self, lowered: &str) -> bool {
        match &self.workflow_phrases {
            Some(ac) => ac.is_match(lowered),
            None => WORKFLOW_PHRASES.iter().any(|p| lowered.contains(p)),
        }
    }

    /// Workflow templates this intent calls for.
    ///
    /// Automation requests always carry one; analysis and report requests
    /// only when the message also signals workflow automation.  General
    /// intents never carry any.
    fn required_workflows(&self, kind: IntentKind, lowered: &str) -> BTreeSet<String> {
        let mut templates = BTreeSet::new();
        match kind {
            IntentKind::AutomateWorkflow => {
                let template = if lowered.contains("report") {
                    REPORT_GENERATION_WORKFLOW
                } else {
                    DOCUMENT_ANALYSIS_WORKFLOW
                };
                templates.insert(template.to_string());
            }
            IntentKind::AnalyzeDocument if self.mentions_workflow(lowered) => {
                templates.insert(DOCUMENT_ANALYSIS_WORKFLOW.to_string());
            }
            IntentKind::GenerateReport if self.mentions_workflow(lowered) => {
                templates.insert(REPORT_GENERATION_WORKFLOW.to_string());
            }
            _ => {}
        }
        templates
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for IntentClassifier {
    fn classify(&self, message: &str) -> Intent {
        IntentClassifier::classify(self, message)
    }
}

// ---------------------------------------------------------------------------
// Entity extraction
// ---------------------------------------------------------------------------

/// Extract entities from the message, independent of intent kind.
///
/// At most one value per entity kind: the first `@`-prefixed token becomes
/// the `file` entity (full token, punctuation included), and the first
/// all-digit token becomes the `number` entity (kept as a string to avoid
/// locale ambiguity).
fn extract_entities(message: &str) -> HashMap<String, String> {
    let mut entities = HashMap::new();

    for token in message.split_whitespace() {
        if !entities.contains_key("file") && token.starts_with('@') && token.len() > 1 {
            entities.insert("file".to_string(), token.to_string());
        }
        if !entities.contains_key("number")
            && !token.is_empty()
            && token.chars().all(|c| c.is_ascii_digit())
        {
            entities.insert("number".to_string(), token.to_string());
        }
    }

    entities
}

// ---------------------------------------------------------------------------
// Suggested-task templates
// ---------------------------------------------------------------------------

/// Build the suggested task drafts for a classified message.
fn suggest_tasks(
    kind: IntentKind,
    message: &str,
    entities: &HashMap<String, String>,
) -> Vec<TaskDraft> {
    match kind {
        IntentKind::AnalyzeDocument => {
            let title = match entities.get("file") {
                Some(file) => format!("Document Analysis: {file}"),
                None => "Document Analysis".to_string(),
            };
            vec![
                TaskDraft::new(title, TaskLevel::Complex)
                    .with_description(truncate(message, METADATA_LIMIT))
                    .with_priority(TaskPriority::High)
                    .with_capability("analysis")
                    .with_metadata(message),
            ]
        }
        IntentKind::GenerateReport => vec![
            TaskDraft::new("Report Generation", TaskLevel::CrossCutting)
                .with_description(truncate(message, METADATA_LIMIT))
                .with_priority(TaskPriority::High)
                .with_capability("export")
                .with_metadata(message),
        ],
        IntentKind::AutomateWorkflow => vec![
            TaskDraft::new("Workflow Automation", TaskLevel::CrossCutting)
                .with_description(truncate(message, METADATA_LIMIT))
                .with_priority(TaskPriority::Critical)
                .with_capability("automation")
                .with_metadata(message),
        ],
        IntentKind::CreateTask | IntentKind::General => {
            vec![generic_task(kind.complexity(), message)]
        }
    }
}

/// A generic task derived from the message itself, used for create-task and
/// unclassified requests.
fn generic_task(level: TaskLevel, message: &str) -> TaskDraft {
    let title = if message.is_empty() {
        "General Assistance".to_string()
    } else {
        truncate(message, TITLE_LIMIT)
    };

    TaskDraft::new(title, level)
        .with_tag(tags::AI_CREATED)
        .with_tag(tags::FROM_CHAT)
        .with_metadata(truncate(message, METADATA_LIMIT))
}

/// Truncate to `max` characters, appending an ellipsis when text was cut.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max).collect();
        cut.push('…');
        cut
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_document_message() {
        let classifier = IntentClassifier::new();
        let intent =
            classifier.classify("Analyze the financial document and extract key insights");

        assert_eq!(intent.kind, IntentKind::AnalyzeDocument);
        assert!(intent.confidence > 0.8);
        assert_eq!(intent.suggested_tasks.len(), 1);

        let task = &intent.suggested_tasks[0];
        assert!(task.title.contains("Document Analysis"));
        assert_eq!(task.level, TaskLevel::Complex);
        assert!(task.required_capabilities.contains("analysis"));
        // No workflow phrase, so no workflow templates.
        assert!(intent.required_workflows.is_empty());
    }

    #[test]
    fn generate_report_message() {
        let classifier = IntentClassifier::new();
        let intent = classifier.classify("Generate a comprehensive financial report for Q4");

        assert_eq!(intent.kind, IntentKind::GenerateReport);
        assert!(intent.confidence > 0.8);

        let task = &intent.suggested_tasks[0];
        assert_eq!(task.level, TaskLevel::CrossCutting);
        assert!(task.required_capabilities.contains("export"));
    }

    #[test]
    fn automate_workflow_message() {
        let classifier = IntentClassifier::new();
        let intent = classifier.classify("Automate the document processing workflow");

        assert_eq!(intent.kind, IntentKind::AutomateWorkflow);
        let task = &intent.suggested_tasks[0];
        assert_eq!(task.priority, TaskPriority::Critical);
        assert!(task.required_capabilities.contains("automation"));
        assert!(
            intent
                .required_workflows
                .contains(DOCUMENT_ANALYSIS_WORKFLOW)
        );
    }

    #[test]
    fn automation_beats_other_rules() {
        let classifier = IntentClassifier::new();
        // Contains both "analyze"+"document" and "automate"+"workflow";
        // the automation rule is evaluated first.
        let intent =
            classifier.classify("Automate a workflow to analyze every document we receive");
        assert_eq!(intent.kind, IntentKind::AutomateWorkflow);
    }

    #[test]
    fn file_entity_captures_full_token() {
        let classifier = IntentClassifier::new();
        let intent = classifier.classify("Analyze document @financial_report.pdf");
        assert_eq!(
            intent.entities.get("file").map(String::as_str),
            Some("@financial_report.pdf")
        );
    }

    #[test]
    fn number_entity_is_first_integer_token() {
        let classifier = IntentClassifier::new();
        let intent = classifier.classify("Create 5 financial analysis tasks");
        assert_eq!(intent.kind, IntentKind::CreateTask);
        assert_eq!(intent.entities.get("number").map(String::as_str), Some("5"));
    }

    #[test]
    fn number_must_be_standalone() {
        let classifier = IntentClassifier::new();
        // "Q4" is not a standalone integer token.
        let intent = classifier.classify("Summarize Q4 revenue");
        assert!(intent.entities.get("number").is_none());
    }

    #[test]
    fn empty_message_still_produces_a_suggestion() {
        let classifier = IntentClassifier::new();
        let intent = classifier.classify("");

        assert_eq!(intent.kind, IntentKind::General);
        assert!(intent.confidence < 0.5);
        assert!(intent.required_workflows.is_empty());
        assert_eq!(intent.suggested_tasks.len(), 1);
        assert!(intent.suggested_tasks[0].tags.contains(tags::AI_CREATED));
    }

    #[test]
    fn general_intent_never_requires_workflows() {
        let classifier = IntentClassifier::new();
        // Mentions a workflow phrase but matches no rule.
        let intent = classifier.classify("What happens with multiple documents here");
        assert_eq!(intent.kind, IntentKind::General);
        assert!(intent.required_workflows.is_empty());
    }

    #[test]
    fn workflow_phrase_upgrades_analysis() {
        let classifier = IntentClassifier::new();
        let intent = classifier.classify("Analyze the multiple documents in this folder");
        assert_eq!(intent.kind, IntentKind::AnalyzeDocument);
        assert!(
            intent
                .required_workflows
                .contains(DOCUMENT_ANALYSIS_WORKFLOW)
        );
    }

    #[test]
    fn report_automation_picks_report_template() {
        let classifier = IntentClassifier::new();
        let intent = classifier.classify("Automate the monthly report workflow");
        assert_eq!(intent.kind, IntentKind::AutomateWorkflow);
        assert!(
            intent
                .required_workflows
                .contains(REPORT_GENERATION_WORKFLOW)
        );
    }

    #[test]
    fn long_messages_are_truncated_with_ellipsis() {
        let classifier = IntentClassifier::new();
        let long = "please ".repeat(40);
        let intent = classifier.classify(&long);

        let metadata = &intent.suggested_tasks[0].metadata;
        assert!(metadata.chars().count() <= METADATA_LIMIT + 1);
        assert!(metadata.ends_with('…'));
    }

    #[test]
    fn classification_is_case_insensitive() {
        let classifier = IntentClassifier::new();
        let intent = classifier.classify("ANALYZE THIS DOCUMENT");
        assert_eq!(intent.kind, IntentKind::AnalyzeDocument);
    }
}
