//! Coordination façade for the Conductor orchestration engine.
//!
//! This crate provides:
//!
//! - **[`coordinator`]** -- The [`Coordinator`]: session lifecycle, the
//!   message-processing pipeline (classification → task materialization →
//!   auto-start → workflow expansion → multi-agent fan-out), and the
//!   caller-facing query API.
//! - **[`agent`]** -- The narrow [`AgentInvoker`] seam to backing LLM
//!   providers, with timeout-bounded fan-out.
//! - **[`analytics`]** -- Pure [`Analytics`] derivation over the session
//!   history and registry contents.
//! - **[`session`]** -- Session state, status views, and the serializable
//!   [`SessionSnapshot`].
//! - **[`config`]** -- Tunable thresholds with TOML overrides.
//!
//! All public types are `Send + Sync`; one coordinator instance safely
//! serves many concurrent callers.

pub mod agent;
pub mod analytics;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod session;

pub use agent::{AgentError, AgentInvoker, AgentProvider, AgentResponse};
pub use analytics::Analytics;
pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use error::{CoordinatorError, Result};
pub use session::{SessionSnapshot, SessionStatus};
