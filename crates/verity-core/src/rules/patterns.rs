//! Detection patterns for logically defective queries.
//!
//! All patterns are case-insensitive and match anywhere in the query text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // =========================================================================
    // LOGICAL CONTRADICTION PATTERNS
    // =========================================================================

    /// A run of comparison operator characters (`==`, `!=`, `<=`, `>`, ...)
    pub static ref COMPARISON_OPERATOR: Regex = Regex::new(r"[!=<>]+").unwrap();

    /// Zero-count condition alongside an existence condition
    pub static ref ZERO_COUNT_EXISTS: Regex = Regex::new(
        r"(?i)count.*==.*0.*and.*exists"
    ).unwrap();

    /// Lower bound of nine or more repeated nines, written as `>`, `>=`,
    /// `$gt` or `$gte`
    pub static ref SENTINEL_NUMBER: Regex = Regex::new(
        r#"(?i)(?:>=?|\$gte?['"]?\s*:)\s*9{9,}"#
    ).unwrap();

    // =========================================================================
    // AGGREGATION PIPELINE PATTERNS
    // =========================================================================

    /// `$match` stage followed by an empty filter object
    pub static ref EMPTY_MATCH_STAGE: Regex = Regex::new(
        r"(?i)\$match.*\{\s*\}"
    ).unwrap();

    /// `$group` stage whose `_id` is referenced twice
    pub static ref DUPLICATE_GROUP_ID: Regex = Regex::new(
        r"(?i)\$group.*_id.*_id"
    ).unwrap();
}

/// Check if the query compares a field to itself (`x == x`, `a >= A`).
///
/// Any trailing part of the word left of the operator counts as the field,
/// and it must open the text right of the operator.
pub fn contains_self_comparison(query: &str) -> bool {
    COMPARISON_OPERATOR.find_iter(query).any(|op| {
        let left = query[..op.start()].trim_end();
        let right = query[op.end()..].trim_start().to_lowercase();

        let word_start = left
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_word_char(*c))
            .last()
            .map(|(i, _)| i);

        let Some(start) = word_start else {
            return false;
        };

        let word = left[start..].to_lowercase();
        word.char_indices()
            .any(|(i, _)| right.starts_with(&word[i..]))
    })
}

/// Check for a zero-count condition combined with an existence check.
pub fn contains_zero_count_exists(query: &str) -> bool {
    ZERO_COUNT_EXISTS.is_match(query)
}

/// Check for an implausibly large sentinel bound.
///
/// Only lower bounds count; a bare `999999999` is not a comparison.
pub fn contains_sentinel_number(query: &str) -> bool {
    SENTINEL_NUMBER.is_match(query)
}

/// Check for an empty filter after a `$match` stage.
pub fn contains_empty_match(query: &str) -> bool {
    EMPTY_MATCH_STAGE.is_match(query)
}

/// Check for a `$group` stage referencing `_id` twice.
pub fn contains_duplicate_group_id(query: &str) -> bool {
    DUPLICATE_GROUP_ID.is_match(query)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
