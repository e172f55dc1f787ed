//! Verdict gate: applies thresholds to the four metrics.
//!
//! The policy is strict and non-weighted:
//! - semantic-error rate must be at most its threshold;
//! - execution-success rate must be at least its threshold;
//! - empty-result rate must be at most its threshold;
//! - accuracy rate must be at least its threshold.
//!
//! The verdict passes only if all four hold. There is no partial credit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Thresholds;

/// The four metric values, as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRates {
    pub semantic_error: f64,
    pub execution_success: f64,
    pub empty_result: f64,
    pub accuracy: f64,
}

/// Which metric a check is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    SemanticError,
    ExecutionSuccess,
    EmptyResult,
    Accuracy,
}

impl MetricKind {
    /// Human-readable label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::SemanticError => "Semantic error rate",
            MetricKind::ExecutionSuccess => "Execution success rate",
            MetricKind::EmptyResult => "Empty result rate",
            MetricKind::Accuracy => "Accuracy rate",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction of a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// Value must not exceed the threshold
    AtMost,
    /// Value must reach the threshold
    AtLeast,
}

impl Bound {
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Bound::AtMost => value <= threshold,
            Bound::AtLeast => value >= threshold,
        }
    }

    /// `≤` or `≥`.
    pub fn symbol(&self) -> &'static str {
        match self {
            Bound::AtMost => "≤",
            Bound::AtLeast => "≥",
        }
    }
}

/// One metric checked against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCheck {
    pub metric: MetricKind,
    pub value: f64,
    pub threshold: f64,
    pub bound: Bound,
    pub passed: bool,
}

impl ThresholdCheck {
    fn new(metric: MetricKind, value: f64, threshold: f64, bound: Bound) -> Self {
        Self {
            metric,
            value,
            threshold,
            bound,
            passed: bound.holds(value, threshold),
        }
    }
}

/// Applies a fixed set of thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VerdictGate {
    thresholds: Thresholds,
}

impl VerdictGate {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Per-metric checks, in report order.
    pub fn checks(&self, rates: &MetricRates) -> [ThresholdCheck; 4] {
        let t = &self.thresholds;
        [
            ThresholdCheck::new(MetricKind::SemanticError, rates.semantic_error, t.semantic_error, Bound::AtMost),
            ThresholdCheck::new(MetricKind::ExecutionSuccess, rates.execution_success, t.execution_success, Bound::AtLeast),
            ThresholdCheck::new(MetricKind::EmptyResult, rates.empty_result, t.empty_result, Bound::AtMost),
            ThresholdCheck::new(MetricKind::Accuracy, rates.accuracy, t.accuracy, Bound::AtLeast),
        ]
    }

    /// Pass iff every metric meets its threshold.
    pub fn decide(&self, rates: &MetricRates) -> bool {
        self.checks(rates).iter().all(|c| c.passed)
    }
}
