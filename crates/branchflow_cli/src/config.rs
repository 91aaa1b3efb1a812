//! Configuration file.
//!
//! A JSON object with optional `gate`, `sanitizer` and `engine` sections;
//! anything omitted keeps its default.

use std::path::Path;

use branchflow_policy::{SafetyGate, Sanitizer};
use branchflow_runtime::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Complete BRANCHFLOW configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchflowConfig {
    /// Input gate
    pub gate: SafetyGate,
    /// Text sanitizer
    pub sanitizer: Sanitizer,
    /// Flow engine
    pub engine: EngineConfig,
}

impl BranchflowConfig {
    /// Load from a JSON file, or use defaults when no path is given
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_no_path_uses_defaults() {
        let config = BranchflowConfig::load(None).unwrap();
        assert_eq!(config, BranchflowConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = concat!(
            r#"{"engine": {"auto_replay_delay": 20, "next_label": "Next"}, "#,
            r#""sanitizer": {"max_depth": 2}}"#
        );
        file.write_all(json.as_bytes()).unwrap();

        let config = BranchflowConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.engine.auto_replay_delay.as_millis(), 20);
        assert_eq!(config.engine.next_label, "Next");
        assert_eq!(config.engine.start_step.as_str(), "1");
        assert_eq!(config.sanitizer.max_depth, 2);
        assert_eq!(config.gate, SafetyGate::default());
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            BranchflowConfig::load(Some(file.path())),
            Err(CliError::Config { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            BranchflowConfig::load(Some(&path)),
            Err(CliError::Read { .. })
        ));
    }
}
