//! Learned categorization rules
//!
//! A rule maps a normalized merchant fragment to a category. Rules are only
//! ever appended or boosted, never rewritten; match order is insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, RuleId};

/// A learned merchant-pattern rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizationRule {
    /// Unique identifier
    pub id: RuleId,
    /// Category this rule assigns
    pub category_id: CategoryId,
    /// Normalized merchant fragment matched by case-insensitive containment
    pub pattern: String,
    /// When the rule was first learned
    pub created_at: DateTime<Utc>,
    /// How many times this rule has been confirmed (manual edit or AI)
    pub hit_count: u32,
}

impl CategorizationRule {
    /// Create a fresh rule with a hit count of one
    pub fn new(pattern: impl Into<String>, category_id: CategoryId) -> Self {
        Self {
            id: RuleId::new(),
            category_id,
            pattern: pattern.into(),
            created_at: Utc::now(),
            hit_count: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rule_starts_at_one_hit() {
        let rule = CategorizationRule::new("cloud coffee", CategoryId::new("dining"));
        assert_eq!(rule.hit_count, 1);
        assert_eq!(rule.pattern, "cloud coffee");
    }
}
