//! Core types shared across the evaluation engine.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::Thresholds;
use crate::rules::SemanticFinding;
use crate::table::ComparisonTable;
use crate::verdict::{MetricRates, ThresholdCheck, VerdictGate};

/// Candidate or reference results keyed by metric name, in insertion order.
pub type ResultMap = IndexMap<String, Value>;

/// A single result value produced by an analysis.
///
/// The variant is decided once when the value enters the engine, so the
/// comparator and the table builder only ever switch on this closed set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

/// The variant tag of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    Text,
    Sequence,
    Mapping,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::Sequence(_) => ValueKind::Sequence,
            Value::Mapping(_) => ValueKind::Mapping,
        }
    }

    /// The numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Element count for sequences and mappings.
    pub fn collection_len(&self) -> Option<usize> {
        match self {
            Value::Sequence(items) => Some(items.len()),
            Value::Mapping(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Whether any text in this value (mapping keys included) contains
    /// `needle`, compared case-insensitively.
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.mentions_lowercase(&needle)
    }

    fn mentions_lowercase(&self, needle: &str) -> bool {
        match self {
            Value::Text(s) => s.to_lowercase().contains(needle),
            Value::Sequence(items) => items.iter().any(|v| v.mentions_lowercase(needle)),
            Value::Mapping(entries) => entries
                .iter()
                .any(|(k, v)| k.to_lowercase().contains(needle) || v.mentions_lowercase(needle)),
            Value::Null | Value::Bool(_) | Value::Number(_) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Sequence(_) | Value::Mapping(_) => {
                let rendered = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Mapping(
                entries.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

/// One record from the pipeline's execution log.
///
/// Only `status` and `error` are interpreted; everything else the pipeline
/// recorded is kept in `details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(flatten)]
    pub details: IndexMap<String, serde_json::Value>,
}

impl ExecutionLog {
    /// A log entry with `status: "success"`.
    pub fn success() -> Self {
        Self {
            status: Some("success".to_string()),
            ..Self::default()
        }
    }

    /// A log entry carrying an error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: Some("error".to_string()),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Succeeded if the status says so, or if no error was recorded.
    pub fn succeeded(&self) -> bool {
        self.status.as_deref() == Some("success")
            || self.error.as_deref().map_or(true, |e| e.is_empty())
    }
}

/// Which accuracy tier produced the accuracy rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccuracySource {
    /// Compared against the bundle's independently computed reference results.
    Reference,
    /// Compared against a caller-supplied ground-truth map.
    GroundTruth,
    /// No reference available; internal consistency heuristic.
    Consistency,
}

impl fmt::Display for AccuracySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccuracySource::Reference => "reference",
            AccuracySource::GroundTruth => "ground-truth",
            AccuracySource::Consistency => "consistency",
        };
        f.write_str(s)
    }
}

/// The outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Share of issued queries flagged by the semantic detector (0.0 - 1.0)
    pub semantic_error_rate: f64,

    /// Share of execution logs that succeeded (0.0 - 1.0)
    pub execution_success_rate: f64,

    /// Share of results that are empty or invalid (0.0 - 1.0)
    pub empty_result_rate: f64,

    /// Agreement with the best available reference (0.0 - 1.0)
    pub accuracy_rate: f64,

    /// True only if every metric met its threshold
    pub overall_pass: bool,

    /// Thresholds the verdict was decided against
    pub thresholds: Thresholds,

    /// Tier the accuracy rate came from
    pub accuracy_source: AccuracySource,

    /// Candidate vs reference, row per metric name
    pub comparison_table: ComparisonTable,

    /// Queries the semantic detector flagged, in query order
    #[serde(default)]
    pub semantic_findings: Vec<SemanticFinding>,
}

impl EvaluationMetrics {
    /// The four rates, as consumed by the verdict gate.
    pub fn rates(&self) -> MetricRates {
        MetricRates {
            semantic_error: self.semantic_error_rate,
            execution_success: self.execution_success_rate,
            empty_result: self.empty_result_rate,
            accuracy: self.accuracy_rate,
        }
    }

    /// Per-metric checks against the thresholds the verdict used.
    ///
    /// `overall_pass` is true exactly when every check passed.
    pub fn checks(&self) -> [ThresholdCheck; 4] {
        VerdictGate::new(self.thresholds).checks(&self.rates())
    }
}
