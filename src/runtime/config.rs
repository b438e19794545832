use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a [`LispEvaluator`](crate::runtime::LispEvaluator)
///
/// Missing JSON fields fall back to their defaults, so `{}` is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Maximum nesting of non-tail evaluation before failing with
    /// `RecursionLimit`; tail calls and `loop/recur` never count against it
    pub max_depth: usize,
    /// Load the bootstrap library (`defn`, `cond`, `reduce`, ...) at startup
    pub load_bootstrap: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            max_depth: 1000,
            load_bootstrap: true,
        }
    }
}

impl EvaluatorConfig {
    /// Parses a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Configuration without the bootstrap library
    pub fn bare() -> Self {
        EvaluatorConfig {
            load_bootstrap: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvaluatorConfig::default();
        assert_eq!(config.max_depth, 1000);
        assert!(config.load_bootstrap);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EvaluatorConfig::from_json(r#"{"max_depth": 64}"#).unwrap();
        assert_eq!(config.max_depth, 64);
        assert!(config.load_bootstrap);
        assert_eq!(EvaluatorConfig::from_json("{}").unwrap(), EvaluatorConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            EvaluatorConfig::from_json(r#"{"max_depth": "deep"}"#),
            Err(Error::InvalidConfig(_))
        ));
    }
}
