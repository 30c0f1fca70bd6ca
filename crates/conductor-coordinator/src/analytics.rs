//! Session analytics aggregation.
//!
//! [`Analytics`] is a pure derivation over the session's recognized-intent
//! log, the recorded per-message response times, and the registry contents.
//! Every ratio is clamped to `[0, 1]`, the satisfaction score to `[0, 100]`,
//! and all divisions are guarded -- a session with zero events reports zeros
//! across the board.

use serde::{Deserialize, Serialize};

use conductor_intent::{Intent, IntentKind};
use conductor_registry::{TaskQuery, TaskRegistry, TaskStatus, tags};

/// A computed analytics snapshot for one coordination session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    /// Count of recognized intents in the session.
    pub total_coordination_events: usize,
    /// Mean wall-clock time spent processing a message, in milliseconds.
    pub average_response_time_ms: f64,
    /// Registered ai-created tasks per recognized intent, clamped to `[0,1]`.
    pub task_creation_rate: f64,
    /// Fraction of intents that called for at least one workflow template.
    pub workflow_automation_rate: f64,
    /// Fraction of intents classified as something other than general.
    pub intent_recognition_accuracy: f64,
    /// Multi-provider consultations per recognized intent, clamped to `[0,1]`.
    pub multi_agent_usage_ratio: f64,
    /// Fraction of ai-created tasks that moved beyond pending.
    pub conversation_efficiency: f64,
    /// Composite satisfaction estimate on a 0–100 scale.
    pub user_satisfaction_score: f64,
}

impl Analytics {
    /// An all-zero snapshot, reported for sessions with no events.
    pub fn empty() -> Self {
        Self {
            total_coordination_events: 0,
            average_response_time_ms: 0.0,
            task_creation_rate: 0.0,
            workflow_automation_rate: 0.0,
            intent_recognition_accuracy: 0.0,
            multi_agent_usage_ratio: 0.0,
            conversation_efficiency: 0.0,
            user_satisfaction_score: 0.0,
        }
    }

    /// Derive a snapshot from the session's recorded history.
    pub fn compute(
        intents: &[Intent],
        response_times_ms: &[f64],
        registry: &TaskRegistry,
    ) -> Self {
        let total = intents.len();
        if total == 0 {
            return Self::empty();
        }
        let total_f = total as f64;

        let average_response_time_ms = if response_times_ms.is_empty() {
            0.0
        } else {
            response_times_ms.iter().sum::<f64>() / response_times_ms.len() as f64
        };

        let ai_created = registry.query(&TaskQuery::new().with_tag(tags::AI_CREATED));
        let task_creation_rate = (ai_created.len() as f64 / total_f).min(1.0);

        let started = ai_created
            .iter()
            .filter(|t| t.status != TaskStatus::Pending)
            .count();
        let conversation_efficiency = if ai_created.is_empty() {
            0.0
        } else {
            started as f64 / ai_created.len() as f64
        };

        let automated = intents
            .iter()
            .filter(|i| !i.required_workflows.is_empty())
            .count();
        let workflow_automation_rate = automated as f64 / total_f;

        let recognized = intents
            .iter()
            .filter(|i| i.kind != IntentKind::General)
            .count();
        let intent_recognition_accuracy = recognized as f64 / total_f;

        let consultations = registry
            .query(&TaskQuery::new().with_tag(tags::MULTI_LLM))
            .len();
        let multi_agent_usage_ratio = (consultations as f64 / total_f).min(1.0);

        let mean_confidence = intents.iter().map(|i| i.confidence).sum::<f64>() / total_f;
        let user_satisfaction_score = 100.0
            * ((intent_recognition_accuracy + mean_confidence + conversation_efficiency) / 3.0)
                .clamp(0.0, 1.0);

        Self {
            total_coordination_events: total,
            average_response_time_ms,
            task_creation_rate,
            workflow_automation_rate,
            intent_recognition_accuracy,
            multi_agent_usage_ratio,
            conversation_efficiency,
            user_satisfaction_score,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
