//! Semantic error detection.
//!
//! A query has a semantic error when it runs but cannot mean what the
//! analysis intended: a field compared to itself, contradictory conditions,
//! sentinel bounds, or results that contradict the intent (negative counts,
//! rates above 100).
//!
//! Rules are independent predicates evaluated in a fixed order. The first
//! rule that fires decides; the rest are skipped.
//!
//! | Order | Rule | Looks at |
//! |-------|------|----------|
//! | 1 | `self-comparison` | query |
//! | 2 | `zero-count-exists` | query |
//! | 3 | `sentinel-number` | query |
//! | 4 | `empty-match` | query |
//! | 5 | `duplicate-group-id` | query |
//! | 6 | `negative-count` | query + results |
//! | 7 | `rate-overflow` | intent + results |

mod intent;
mod logic;
pub mod patterns;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bundle::AnalysisBundle;

pub use intent::{NegativeCountRule, RateOverflowRule};
pub use logic::PatternRule;

/// Stable identifier of a semantic rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    SelfComparison,
    ZeroCountExists,
    SentinelNumber,
    EmptyMatch,
    DuplicateGroupId,
    NegativeCount,
    RateOverflow,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::SelfComparison => "self-comparison",
            RuleId::ZeroCountExists => "zero-count-exists",
            RuleId::SentinelNumber => "sentinel-number",
            RuleId::EmptyMatch => "empty-match",
            RuleId::DuplicateGroupId => "duplicate-group-id",
            RuleId::NegativeCount => "negative-count",
            RuleId::RateOverflow => "rate-overflow",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single semantic check over one query and its bundle.
pub trait SemanticRule: Send + Sync {
    /// Which rule this is.
    fn id(&self) -> RuleId;

    /// One-line description for listings and reports.
    fn description(&self) -> &'static str;

    /// Whether this rule flags `query`.
    fn fires(&self, query: &str, bundle: &AnalysisBundle) -> bool;
}

/// A query flagged by the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticFinding {
    /// Position in `AnalysisBundle::queries`
    pub query_index: usize,

    /// The flagged query text
    pub query: String,

    /// The first rule that fired
    pub rule: RuleId,
}

/// The built-in rules, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn SemanticRule>> {
    vec![
        Box::new(PatternRule::self_comparison()),
        Box::new(PatternRule::zero_count_exists()),
        Box::new(PatternRule::sentinel_number()),
        Box::new(PatternRule::empty_match()),
        Box::new(PatternRule::duplicate_group_id()),
        Box::new(NegativeCountRule),
        Box::new(RateOverflowRule),
    ]
}

/// Runs an ordered rule list against queries.
pub struct SemanticErrorDetector {
    rules: Vec<Box<dyn SemanticRule>>,
}

impl SemanticErrorDetector {
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Use a custom rule list, evaluated in the given order.
    pub fn with_rules(rules: Vec<Box<dyn SemanticRule>>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn SemanticRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// The first rule that flags `query`, if any.
    pub fn detect(&self, query: &str, bundle: &AnalysisBundle) -> Option<RuleId> {
        let hit = self
            .rules
            .iter()
            .find(|rule| rule.fires(query, bundle))
            .map(|rule| rule.id());

        if let Some(rule) = hit {
            tracing::trace!(rule = %rule, "Semantic rule fired");
        }

        hit
    }

    pub fn has_semantic_error(&self, query: &str, bundle: &AnalysisBundle) -> bool {
        self.detect(query, bundle).is_some()
    }

    /// Every flagged query in the bundle, in query order.
    pub fn findings(&self, bundle: &AnalysisBundle) -> Vec<SemanticFinding> {
        bundle
            .queries
            .iter()
            .enumerate()
            .filter_map(|(query_index, query)| {
                self.detect(query, bundle).map(|rule| SemanticFinding {
                    query_index,
                    query: query.clone(),
                    rule,
                })
            })
            .collect()
    }
}

impl Default for SemanticErrorDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SemanticErrorDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.id()))
            .finish()
    }
}
