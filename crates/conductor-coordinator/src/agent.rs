//! Agent invocation interface.
//!
//! The coordinator consults backing LLM providers through the narrow
//! [`AgentInvoker`] seam; the transport, credentials, and retry behavior
//! live behind it.  Invocations happen strictly outside the registry
//! critical section, and the collaborator is expected to bound its own
//! latency -- the coordinator additionally applies a timeout so a hung
//! provider degrades to "no contribution" instead of stalling a message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// A backing agent provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentProvider {
    Claude,
    OpenAi,
    Gemini,
}

impl AgentProvider {
    /// Every provider, in fan-out order.
    pub const ALL: [AgentProvider; 3] = [Self::Claude, Self::OpenAi, Self::Gemini];
}

impl std::fmt::Display for AgentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Claude => "claude",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Invocation types
// ---------------------------------------------------------------------------

/// A successful agent response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// The provider that produced this response.
    pub provider: AgentProvider,
    /// The response text.
    pub text: String,
}

/// Errors surfaced by agent invocation.  All recoverable: the coordinator
/// downgrades failed consultations to "no multi-agent contribution".
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The provider did not answer within the agreed window.
    #[error("agent call to {provider} timed out after {waited_ms} ms")]
    Timeout {
        provider: AgentProvider,
        waited_ms: u64,
    },

    /// The provider answered with an error.
    #[error("agent provider {provider} failed: {reason}")]
    Provider {
        provider: AgentProvider,
        reason: String,
    },

    /// No invoker has been configured on this coordinator.
    #[error("no agent invoker is configured")]
    NotConfigured,
}

/// The external agent-invocation collaborator.
///
/// Implementations must be safe to call from multiple concurrent tasks and
/// must not assume any registry lock is held.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Send a prompt to one provider and return its response.
    async fn invoke(
        &self,
        provider: AgentProvider,
        prompt: &str,
    ) -> std::result::Result<AgentResponse, AgentError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
