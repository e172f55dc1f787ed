//! Evaluation configuration.
//!
//! Everything here has a documented default; any subset can be supplied in
//! a YAML or JSON document and the rest is filled in. Programmatic
//! construction never fails. Loading from a document rejects values that
//! cannot be meaningful (non-finite numbers, thresholds outside `[0, 1]`,
//! a negative tolerance).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::compare::DEFAULT_TOLERANCE;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Pass/fail thresholds for the four metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Maximum allowed semantic-error rate
    pub semantic_error: f64,

    /// Minimum required execution-success rate
    pub execution_success: f64,

    /// Maximum allowed empty/invalid-result rate
    pub empty_result: f64,

    /// Minimum required accuracy rate
    pub accuracy: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            semantic_error: 0.10,
            execution_success: 0.80,
            empty_result: 0.20,
            accuracy: 0.90,
        }
    }
}

impl Thresholds {
    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("semantic_error", self.semantic_error),
            ("execution_success", self.execution_success),
            ("empty_result", self.empty_result),
            ("accuracy", self.accuracy),
        ];

        for (name, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "thresholds.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Score deductions used by the consistency heuristic when no reference
/// results or ground truth are available.
///
/// These are tuning values, not derived constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyPenalties {
    /// Per negative number, when the results mention counting
    pub negative_count: f64,

    /// Per number above `large_value_limit`
    pub large_value: f64,

    /// Values strictly above this are implausibly large
    pub large_value_limit: f64,

    /// Per rate/ratio metric outside `[0, 100]`
    pub rate_out_of_range: f64,
}

impl Default for ConsistencyPenalties {
    fn default() -> Self {
        Self {
            negative_count: 0.2,
            large_value: 0.1,
            large_value_limit: 10_000_000.0,
            rate_out_of_range: 0.3,
        }
    }
}

impl ConsistencyPenalties {
    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("negative_count", self.negative_count),
            ("large_value", self.large_value),
            ("large_value_limit", self.large_value_limit),
            ("rate_out_of_range", self.rate_out_of_range),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "penalties.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Full configuration for an [`Evaluator`](crate::Evaluator).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub thresholds: Thresholds,

    /// Maximum absolute difference for two numbers to match
    pub tolerance: f64,

    pub penalties: ConsistencyPenalties,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            tolerance: DEFAULT_TOLERANCE,
            penalties: ConsistencyPenalties::default(),
        }
    }
}

impl EvaluatorConfig {
    /// Default configuration with the given thresholds.
    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    /// Parse a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: EvaluatorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EvaluatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file; `.json` is parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        self.penalties.validate()?;

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }

        Ok(())
    }
}
