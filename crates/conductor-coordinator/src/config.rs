//! Coordinator configuration.
//!
//! A [`CoordinatorConfig`] fixes the engine's tunable thresholds.  The
//! defaults are the production values; a TOML file may override any subset
//! of fields.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::AgentProvider;
use crate::error::Result;

/// Tunable coordinator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Intents above this confidence auto-start their suggested tasks and
    /// qualify for multi-agent consultation.  The comparison is strict.
    pub auto_start_confidence: f64,

    /// Upper bound on a single agent invocation during fan-out.
    pub agent_timeout_ms: u64,

    /// Capacity of the change-event broadcast channel.
    pub event_capacity: usize,

    /// Whether cross-cutting intents trigger multi-agent consultation.
    pub multi_agent_enabled: bool,

    /// The primary backing agent provider.
    pub default_provider: AgentProvider,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            auto_start_confidence: 0.8,
            agent_timeout_ms: 5_000,
            event_capacity: 256,
            multi_agent_enabled: false,
            default_provider: AgentProvider::Claude,
        }
    }
}

impl CoordinatorConfig {
    /// The agent timeout as a [`Duration`].
    pub fn agent_timeout(&self) -> Duration {
        Duration::from_millis(self.agent_timeout_ms)
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.auto_start_confidence, 0.8);
        assert_eq!(config.agent_timeout(), Duration::from_secs(5));
        assert_eq!(config.event_capacity, 256);
        assert!(!config.multi_agent_enabled);
        assert_eq!(config.default_provider, AgentProvider::Claude);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = CoordinatorConfig::from_toml_str(
            r#"
            multi_agent_enabled = true
            default_provider = "gemini"
            "#,
        )
        .expect("valid toml");

        assert!(config.multi_agent_enabled);
        assert_eq!(config.default_provider, AgentProvider::Gemini);
        // Untouched fields keep their defaults.
        assert_eq!(config.auto_start_confidence, 0.8);
        assert_eq!(config.agent_timeout_ms, 5_000);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let result = CoordinatorConfig::from_toml_str("auto_start_confidence = \"high\"");
        assert!(result.is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "agent_timeout_ms = 1000").expect("write");

        let config = CoordinatorConfig::load(file.path()).expect("load");
        assert_eq!(config.agent_timeout(), Duration::from_secs(1));
    }
}
