//! Rules that inspect the query text alone.

use crate::bundle::AnalysisBundle;

use super::patterns;
use super::{RuleId, SemanticRule};

/// A query-text rule backed by a pattern check.
pub struct PatternRule {
    id: RuleId,
    description: &'static str,
    check: fn(&str) -> bool,
}

impl PatternRule {
    /// A field compared to itself.
    pub fn self_comparison() -> Self {
        Self {
            id: RuleId::SelfComparison,
            description: "Field compared to itself",
            check: patterns::contains_self_comparison,
        }
    }

    /// A zero-count condition alongside an existence condition.
    pub fn zero_count_exists() -> Self {
        Self {
            id: RuleId::ZeroCountExists,
            description: "Zero-count condition combined with an existence condition",
            check: patterns::contains_zero_count_exists,
        }
    }

    /// A bound made of nine or more nines.
    pub fn sentinel_number() -> Self {
        Self {
            id: RuleId::SentinelNumber,
            description: "Implausibly large sentinel number",
            check: patterns::contains_sentinel_number,
        }
    }

    /// An empty filter after a `$match` stage.
    pub fn empty_match() -> Self {
        Self {
            id: RuleId::EmptyMatch,
            description: "Empty filter in a $match stage",
            check: patterns::contains_empty_match,
        }
    }

    /// A `$group` stage referencing `_id` twice.
    pub fn duplicate_group_id() -> Self {
        Self {
            id: RuleId::DuplicateGroupId,
            description: "Grouping identifier referenced twice",
            check: patterns::contains_duplicate_group_id,
        }
    }
}

impl SemanticRule for PatternRule {
    fn id(&self) -> RuleId {
        self.id
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn fires(&self, query: &str, _bundle: &AnalysisBundle) -> bool {
        (self.check)(query)
    }
}
