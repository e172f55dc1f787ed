//! Value comparison with numeric tolerance.
//!
//! Rules, first applicable wins:
//! 1. Two numbers match if they differ by at most the tolerance.
//! 2. Two texts match if equal after trimming, ignoring case.
//! 3. Two sequences, or two mappings, match if deeply equal.
//! 4. Values of different kinds never match.
//! 5. Anything else falls back to plain equality.
//!
//! Comparison never fails: incompatible values simply do not match.

use crate::types::Value;

/// Default maximum absolute difference for two numbers to match.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Compare two values with [`DEFAULT_TOLERANCE`].
pub fn values_match(candidate: &Value, reference: &Value) -> bool {
    values_match_within(candidate, reference, DEFAULT_TOLERANCE)
}

/// Compare two values with an explicit numeric tolerance.
pub fn values_match_within(candidate: &Value, reference: &Value, tolerance: f64) -> bool {
    match (candidate, reference) {
        (Value::Number(a), Value::Number(b)) => (a - b).abs() <= tolerance,
        (Value::Text(a), Value::Text(b)) => normalize_text(a) == normalize_text(b),
        (Value::Sequence(a), Value::Sequence(b)) => a == b,
        (Value::Mapping(a), Value::Mapping(b)) => a == b,
        _ if candidate.kind() != reference.kind() => false,
        _ => candidate == reference,
    }
}

fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}
