//! Candidate vs reference comparison table.
//!
//! Rows follow candidate insertion order. Each candidate key is looked up
//! in the reference results:
//! - found: `matched` (difference `"0"`) or `mismatched` (formatted difference);
//! - not found, or no reference at all: `not-applicable`.
//!
//! Reference keys the candidate never produced are appended afterwards as
//! `missing-in-candidate`. Building a table never fails; differences that
//! cannot be computed are rendered as sentinel text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bundle::AnalysisBundle;
use crate::compare::values_match_within;
use crate::types::Value;

/// Placeholder for an absent value or an inapplicable difference.
pub const NOT_AVAILABLE: &str = "N/A";

/// Difference text for a non-numeric pair.
pub const TYPE_MISMATCH: &str = "type mismatch";

/// Difference text when the numeric difference is not finite.
pub const NOT_COMPUTABLE: &str = "not computable";

/// How a candidate value relates to its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    Matched,
    Mismatched,
    MissingInCandidate,
    NotApplicable,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Matched => "matched",
            MatchStatus::Mismatched => "mismatched",
            MatchStatus::MissingInCandidate => "missing-in-candidate",
            MatchStatus::NotApplicable => "not-applicable",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reconciled metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub metric: String,
    pub candidate: String,
    pub reference: String,
    pub status: MatchStatus,
    pub difference: String,
}

/// Ordered comparison rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparisonTable {
    rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComparisonRow> {
        self.rows.iter()
    }

    /// Rows with the given status.
    pub fn with_status(&self, status: MatchStatus) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().filter(move |r| r.status == status)
    }

    pub fn matched_count(&self) -> usize {
        self.with_status(MatchStatus::Matched).count()
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.with_status(MatchStatus::Mismatched)
    }

    /// Rows that had a value on both sides.
    pub fn compared_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r.status, MatchStatus::Matched | MatchStatus::Mismatched))
            .count()
    }

    /// Matched share of compared rows, `None` if nothing was compared.
    pub fn match_ratio(&self) -> Option<f64> {
        let compared = self.compared_count();
        (compared > 0).then(|| self.matched_count() as f64 / compared as f64)
    }
}

impl From<Vec<ComparisonRow>> for ComparisonTable {
    fn from(rows: Vec<ComparisonRow>) -> Self {
        Self { rows }
    }
}

impl<'a> IntoIterator for &'a ComparisonTable {
    type Item = &'a ComparisonRow;
    type IntoIter = std::slice::Iter<'a, ComparisonRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Reconcile the bundle's candidate and reference results.
pub fn build_table(bundle: &AnalysisBundle, tolerance: f64) -> ComparisonTable {
    let reference = bundle.reference();
    let mut rows = Vec::with_capacity(bundle.results.len());

    for (metric, candidate) in &bundle.results {
        let row = match reference.and_then(|r| r.get(metric)) {
            Some(expected) => {
                let (status, difference) = if values_match_within(candidate, expected, tolerance) {
                    (MatchStatus::Matched, "0".to_string())
                } else {
                    (MatchStatus::Mismatched, format_difference(candidate, expected))
                };

                ComparisonRow {
                    metric: metric.clone(),
                    candidate: format_value(candidate),
                    reference: format_value(expected),
                    status,
                    difference,
                }
            }
            None => ComparisonRow {
                metric: metric.clone(),
                candidate: format_value(candidate),
                reference: NOT_AVAILABLE.to_string(),
                status: MatchStatus::NotApplicable,
                difference: NOT_AVAILABLE.to_string(),
            },
        };
        rows.push(row);
    }

    if let Some(reference) = reference {
        for (metric, expected) in reference {
            if bundle.results.contains_key(metric) {
                continue;
            }
            rows.push(ComparisonRow {
                metric: metric.clone(),
                candidate: NOT_AVAILABLE.to_string(),
                reference: format_value(expected),
                status: MatchStatus::MissingInCandidate,
                difference: NOT_AVAILABLE.to_string(),
            });
        }
    }

    ComparisonTable { rows }
}

/// Display form of a value.
///
/// Whole numbers print without decimals, other numbers with two.
/// Collections print as their kind and length, e.g. `sequence(3)`.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => NOT_AVAILABLE.to_string(),
        Value::Number(n) => format_number(*n),
        Value::Sequence(_) | Value::Mapping(_) => {
            format!("{}({})", value.kind(), value.collection_len().unwrap_or(0))
        }
        Value::Bool(_) | Value::Text(_) => value.to_string(),
    }
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n.is_finite() && n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n)
    }
}

/// Difference between a candidate and its reference.
///
/// Two numbers give the absolute difference and, unless the reference is
/// zero, the difference as a percentage of the reference:
/// `"1.00 (14.3%)"`. Any other pair gives [`TYPE_MISMATCH`].
pub fn format_difference(candidate: &Value, reference: &Value) -> String {
    let (Value::Number(c), Value::Number(r)) = (candidate, reference) else {
        return TYPE_MISMATCH.to_string();
    };

    let diff = (c - r).abs();
    if !diff.is_finite() {
        return NOT_COMPUTABLE.to_string();
    }

    if *r == 0.0 {
        return format!("{:.2}", diff);
    }

    let percentage = diff / r.abs() * 100.0;
    if !percentage.is_finite() {
        return NOT_COMPUTABLE.to_string();
    }

    format!("{:.2} ({:.1}%)", diff, percentage)
}
