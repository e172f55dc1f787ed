//! Keyword lists behind the textual heuristics.
//!
//! These encode domain judgment, not algorithmic necessity, so they live in
//! one place. Analysis intents arrive in English or Korean; the lists carry
//! both. All matching is lowercase substring search.

/// Marks a query or result set as counting something.
pub const COUNT_KEYWORDS: &[&str] = &["count"];

/// Marks an analysis intent as asking for a rate or percentage.
///
/// "율" is a suffix of "비율" and of most Korean rate words.
pub const RATE_INTENT_KEYWORDS: &[&str] = &["비율", "율", "percent", "rate"];

/// Marks a metric name as a rate or ratio, expected within `[0, 100]`.
pub const RATE_METRIC_KEYWORDS: &[&str] = &["rate", "ratio", "비율", "율"];

/// Text results containing any of these are treated as failures.
pub const INVALID_RESULT_TOKENS: &[&str] = &["error", "exception", "failed", "null"];

/// Check if text contains any of the keywords, ignoring case.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw))
}
