//! The coordination façade.
//!
//! A [`Coordinator`] owns one coordination session at a time and routes
//! every incoming message through the same pipeline: classification →
//! task materialization → auto-start policy → workflow expansion →
//! optional multi-agent consultation → session bookkeeping.
//!
//! # Concurrency
//!
//! Multiple callers may invoke [`Coordinator::process_message`] against one
//! instance concurrently.  Registry writes and the paired intent-log append
//! happen inside a single critical section, so every submitted message
//! yields exactly one recognized intent and one processing task -- in
//! classification-completion order, which under concurrency may differ from
//! submission order.  Classification and agent fan-out, the only operations
//! with external latency, run strictly outside that critical section.
//!
//! # Failure policy
//!
//! A message is always answered with a processing task.  Workflow expansion
//! and agent consultation failures degrade to "no workflow" / "no
//! contribution", observable only through the absence of the corresponding
//! tagged tasks.  Messages may also be processed without an active session;
//! the session task merely anchors the bookkeeping chain.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use conductor_intent::{
    Classifier, Intent, IntentClassifier, WorkflowEngine, WorkflowProgress,
};
use conductor_registry::{
    ChangeEvent, EventBus, RegistrySnapshot, Task, TaskDraft, TaskId, TaskLevel, TaskPriority,
    TaskRegistry, TaskStatus, TaskUpdate, tags,
};

use crate::agent::{AgentInvoker, AgentProvider, AgentResponse};
use crate::analytics::Analytics;
use crate::config::CoordinatorConfig;
use crate::error::{CoordinatorError, Result};
use crate::session::{SessionSnapshot, SessionState, SessionStatus};

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Orchestrates classification, task materialization, workflow automation,
/// and multi-agent consultation for one conversational surface.
///
/// All dependencies are injected at construction; there is no ambient
/// global instance.
pub struct Coordinator {
    registry: TaskRegistry,
    classifier: Box<dyn Classifier>,
    workflows: WorkflowEngine,
    agent: Option<Arc<dyn AgentInvoker>>,
    bus: EventBus,
    config: CoordinatorConfig,
    session: Mutex<SessionState>,
}

impl Coordinator {
    /// Create a coordinator with the default heuristic classifier and no
    /// agent invoker.
    #[must_use]
    pub fn new(config: CoordinatorConfig) -> Self {
        let bus = EventBus::new(config.event_capacity);
        let registry = TaskRegistry::with_events(bus.clone());
        let session = Mutex::new(SessionState::new(&config));

        Self {
            registry,
            classifier: Box::new(IntentClassifier::new()),
            workflows: WorkflowEngine::new(),
            agent: None,
            bus,
            config,
            session,
        }
    }

    /// Attach an agent-invocation collaborator for multi-agent fan-out.
    #[must_use]
    pub fn with_agent(mut self, agent: Arc<dyn AgentInvoker>) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Replace the classifier implementation.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Box<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    // -- Session lifecycle ---------------------------------------------------

    /// Start a coordination session.
    ///
    /// Idempotent: if a session is already active, the existing session
    /// task is returned and nothing new is registered.
    pub fn start_session(&self) -> Result<Task> {
        let mut session = self.session.lock().unwrap();

        if session.coordinating
            && let Some(id) = session.session_task_id
        {
            debug!(session_task_id = %id, "coordination session already active");
            return Ok(self.registry.get(id)?);
        }

        let task = self.registry.create(
            TaskDraft::new("AI Coordination Session", TaskLevel::CrossCutting)
                .with_description("Anchor record for the active coordination session")
                .with_priority(TaskPriority::High)
                .with_status(TaskStatus::InProgress)
                .with_tags([tags::AI_COORDINATION, tags::SESSION, tags::LEVEL6]),
        )?;

        session.coordinating = true;
        session.session_task_id = Some(task.id);
        drop(session);

        self.bus.publish(ChangeEvent::SessionStarted {
            session_task_id: task.id,
            timestamp: Utc::now(),
        });
        info!(session_task_id = %task.id, "coordination session started");

        Ok(task)
    }

    /// Stop the active session.
    ///
    /// Flips the coordinating flag and completes the session task.
    /// In-flight message processing is not aborted, and the
    /// recognized-intent log is retained for analytics until
    /// [`Coordinator::clear`].
    pub fn stop_session(&self) -> Result<()> {
        let mut session = self.session.lock().unwrap();
        if !session.coordinating {
            return Ok(());
        }
        session.coordinating = false;
        let session_task_id = session.session_task_id;
        drop(session);

        if let Some(id) = session_task_id {
            if let Err(e) = self
                .registry
                .update(id, TaskUpdate::new().with_status(TaskStatus::Completed))
            {
                warn!(session_task_id = %id, error = %e, "session task completion failed");
            }
            self.bus.publish(ChangeEvent::SessionStopped {
                session_task_id: id,
                timestamp: Utc::now(),
            });
        }

        info!("coordination session stopped");
        Ok(())
    }

    // -- Message processing --------------------------------------------------

    /// Process one incoming message and return its processing task.
    ///
    /// Every call appends exactly one intent to the recognized-intent log
    /// and registers exactly one processing task, even for empty input.
    /// Suggested tasks are materialized and auto-started when the intent's
    /// confidence exceeds the configured threshold; required workflows are
    /// expanded; cross-cutting intents additionally trigger a
    /// timeout-bounded multi-agent consultation when enabled.
    pub async fn process_message(&self, message: &str) -> Result<Task> {
        let started = Instant::now();

        // Classification has no side effects and runs outside every lock.
        let intent = self.classifier.classify(message);

        let (processing_task, should_consult) = self.materialize(message, &intent)?;

        if should_consult {
            let responses = self
                .consult_agents(message, self.config.agent_timeout())
                .await;
            self.record_consultation(message, &responses);
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.session
            .lock()
            .unwrap()
            .response_times_ms
            .push(elapsed_ms);

        let finished = match self.registry.update(
            processing_task.id,
            TaskUpdate::new().with_status(TaskStatus::Completed),
        ) {
            Ok(task) => task,
            Err(e) => {
                warn!(task_id = %processing_task.id, error = %e, "processing task completion failed");
                processing_task
            }
        };

        info!(
            task_id = %finished.id,
            kind = %intent.kind,
            confidence = intent.confidence,
            elapsed_ms,
            "message processed"
        );

        Ok(finished)
    }

    /// The registry-write critical section: processing task, suggested
    /// tasks, auto-start, workflow expansion, and the paired intent-log
    /// append all happen under the session lock so that "task exists" and
    /// "intent logged" never drift apart.
    fn materialize(&self, message: &str, intent: &Intent) -> Result<(Task, bool)> {
        let mut session = self.session.lock().unwrap();

        let processing_task = self.registry.create(
            TaskDraft::new("AI Message Processing", TaskLevel::CrossCutting)
                .with_description("Classify the message and materialize its tasks")
                .with_priority(TaskPriority::High)
                .with_status(TaskStatus::InProgress)
                .with_tags([tags::MESSAGE_PROCESSING, tags::AI_COORDINATION, tags::LEVEL6])
                .with_metadata(message),
        )?;

        let auto_start = intent.confidence > self.config.auto_start_confidence;
        for draft in &intent.suggested_tasks {
            let draft = draft
                .clone()
                .with_tag(tags::AI_CREATED)
                .with_tag(tags::FROM_CHAT);
            match self.registry.create(draft) {
                Ok(task) if auto_start => {
                    if let Err(e) = self
                        .registry
                        .update(task.id, TaskUpdate::new().with_status(TaskStatus::InProgress))
                    {
                        warn!(task_id = %task.id, error = %e, "auto-start failed");
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "suggested task registration failed"),
            }
        }

        for template in &intent.required_workflows {
            match self.workflows.expand(template, message, &self.registry) {
                Ok(progress) => {
                    debug!(
                        workflow_id = %progress.workflow_task_id,
                        template = %template,
                        "workflow activated"
                    );
                    session
                        .active_workflows
                        .insert(progress.workflow_task_id, progress);
                }
                Err(e) => warn!(template = %template, error = %e, "workflow expansion skipped"),
            }
        }

        session.task_suggestions = intent.suggested_tasks.clone();
        session.recognized_intents.push(intent.clone());

        let should_consult = session.multi_agent_enabled
            && intent.complexity() == TaskLevel::CrossCutting
            && self.agent.is_some();

        Ok((processing_task, should_consult))
    }

    /// Fan a prompt out to every provider, bounding each call with the
    /// configured timeout.  Failures and timeouts yield no response rather
    /// than an error.
    async fn consult_agents(&self, prompt: &str, timeout: Duration) -> Vec<AgentResponse> {
        let Some(agent) = self.agent.as_ref() else {
            return Vec::new();
        };

        let invocations = AgentProvider::ALL.iter().map(|&provider| {
            let agent = Arc::clone(agent);
            async move {
                match tokio::time::timeout(timeout, agent.invoke(provider, prompt)).await {
                    Ok(Ok(response)) => Some(response),
                    Ok(Err(e)) => {
                        warn!(provider = %provider, error = %e, "agent invocation failed");
                        None
                    }
                    Err(_) => {
                        warn!(
                            provider = %provider,
                            timeout_ms = timeout.as_millis() as u64,
                            "agent invocation timed out"
                        );
                        None
                    }
                }
            }
        });

        join_all(invocations).await.into_iter().flatten().collect()
    }

    /// Record a completed consultation task when at least one provider
    /// responded.  A fully failed fan-out records nothing.
    fn record_consultation(&self, message: &str, responses: &[AgentResponse]) {
        if responses.is_empty() {
            debug!("multi-agent consultation produced no responses");
            return;
        }

        let providers: Vec<String> = responses.iter().map(|r| r.provider.to_string()).collect();
        let draft = TaskDraft::new("Multi-Agent Consultation", TaskLevel::CrossCutting)
            .with_description(format!("Consulted providers: {}", providers.join(", ")))
            .with_priority(TaskPriority::Critical)
            .with_status(TaskStatus::Completed)
            .with_tags([tags::MULTI_LLM, tags::COORDINATION, tags::LEVEL6])
            .with_metadata(message);

        if let Err(e) = self.registry.create(draft) {
            warn!(error = %e, "consultation task registration failed");
        }
    }

    // -- Workflow driving ----------------------------------------------------

    /// Complete one step of an active workflow.
    pub fn complete_workflow_step(&self, workflow_task_id: TaskId, index: usize) -> Result<Task> {
        let progress = {
            let session = self.session.lock().unwrap();
            session
                .active_workflows
                .get(&workflow_task_id)
                .cloned()
                .ok_or(CoordinatorError::Registry(
                    conductor_registry::RegistryError::TaskNotFound {
                        task_id: workflow_task_id,
                    },
                ))?
        };

        Ok(self
            .workflows
            .complete_step(&self.registry, &progress, index)?)
    }

    // -- Queries -------------------------------------------------------------

    /// Whether a session is currently active.
    pub fn is_coordinating(&self) -> bool {
        self.session.lock().unwrap().coordinating
    }

    /// The ordered recognized-intent log.
    pub fn recognized_intents(&self) -> Vec<Intent> {
        self.session.lock().unwrap().recognized_intents.clone()
    }

    /// The most recent message's unconsumed task suggestions.
    pub fn task_suggestions(&self) -> Vec<TaskDraft> {
        self.session.lock().unwrap().task_suggestions.clone()
    }

    /// Active workflow instances keyed by workflow task id.
    pub fn active_workflows(&self) -> HashMap<TaskId, WorkflowProgress> {
        self.session.lock().unwrap().active_workflows.clone()
    }

    /// The last analytics snapshot, if any has been computed.
    pub fn analytics_snapshot(&self) -> Option<Analytics> {
        self.session.lock().unwrap().analytics.clone()
    }

    /// A point-in-time session status view.
    pub fn session_status(&self) -> SessionStatus {
        let session = self.session.lock().unwrap();
        SessionStatus {
            is_coordinating: session.coordinating,
            session_task_id: session.session_task_id,
            recognized_intent_count: session.recognized_intents.len(),
            active_workflow_count: session.active_workflows.len(),
            multi_agent_enabled: session.multi_agent_enabled,
            current_provider: session.current_provider,
        }
    }

    /// Look up one task.
    pub fn task(&self, id: TaskId) -> Result<Task> {
        Ok(self.registry.get(id)?)
    }

    /// The direct children of a task, in creation order.
    pub fn subtasks(&self, parent: TaskId) -> Vec<Task> {
        self.registry.subtasks(parent)
    }

    /// The underlying registry, for direct queries.
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Subscribe to task and session change events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ChangeEvent>> {
        self.bus.subscribe()
    }

    // -- Toggles -------------------------------------------------------------

    /// Enable or disable multi-agent consultation.
    pub fn set_multi_agent(&self, enabled: bool) {
        self.session.lock().unwrap().multi_agent_enabled = enabled;
    }

    /// Change the primary backing agent provider.
    pub fn set_provider(&self, provider: AgentProvider) {
        self.session.lock().unwrap().current_provider = provider;
    }

    // -- Analytics -----------------------------------------------------------

    /// Compute analytics over the session history, store the snapshot, and
    /// return it.
    pub fn generate_analytics(&self) -> Analytics {
        let mut session = self.session.lock().unwrap();
        let analytics = Analytics::compute(
            &session.recognized_intents,
            &session.response_times_ms,
            &self.registry,
        );
        session.analytics = Some(analytics.clone());
        analytics
    }

    // -- Export / administrative ---------------------------------------------

    /// Export the session: every task in creation order plus the ordered
    /// intent log.
    pub fn export_session(&self) -> SessionSnapshot {
        let session = self.session.lock().unwrap();
        SessionSnapshot {
            tasks: self.registry.export().tasks,
            intents: session.recognized_intents.clone(),
        }
    }

    /// Restore a previously exported session, replacing the registry
    /// contents and the intent log.
    pub fn import_session(&self, snapshot: SessionSnapshot) -> Result<()> {
        let mut session = self.session.lock().unwrap();
        self.registry.import(RegistrySnapshot {
            tasks: snapshot.tasks,
        })?;
        session.recognized_intents = snapshot.intents;
        Ok(())
    }

    /// Administrative reset: drop every task and all session history.
    pub fn clear(&self) {
        let mut session = self.session.lock().unwrap();
        self.registry.clear_all();
        session.reset(&self.config);
        info!("coordinator cleared");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
