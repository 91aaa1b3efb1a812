//! Engine configuration.

use branchflow_core::{Duration, StepId};
use serde::{Deserialize, Serialize};

/// Flow engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Step the first run starts at
    pub start_step: StepId,
    /// Display delay before an auto-replayed choice advances
    pub auto_replay_delay: Duration,
    /// Label recorded when a step is left through its default target
    pub next_label: String,
    /// Maximum number of deferred advances a single `settle` applies
    pub settle_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_step: StepId::new("1"),
            auto_replay_delay: Duration::from_millis(1500),
            next_label: "次へ".to_string(),
            settle_limit: 256,
        }
    }
}

impl EngineConfig {
    /// Set the auto-replay delay
    #[must_use]
    pub fn with_auto_replay_delay(mut self, delay: Duration) -> Self {
        self.auto_replay_delay = delay;
        self
    }

    /// Set the start step
    #[must_use]
    pub fn with_start_step(mut self, start: StepId) -> Self {
        self.start_step = start;
        self
    }

    /// Set the settle limit
    #[must_use]
    pub fn with_settle_limit(mut self, limit: usize) -> Self {
        self.settle_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.start_step.as_str(), "1");
        assert_eq!(config.auto_replay_delay.as_millis(), 1500);
        assert_eq!(config.next_label, "次へ");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"auto_replay_delay": 10}"#).unwrap();
        assert_eq!(config.auto_replay_delay, Duration::from_millis(10));
        assert_eq!(config.start_step, StepId::new("1"));
    }
}
