//! Transaction categorization: learned rules, heuristics, and the AI tier

pub mod pipeline;
pub mod rules;

pub use pipeline::{categorize_with_ai, CategorizeOutcome};
pub use rules::{
    add_or_boost_rule, apply_rules, auto_categorize, auto_rule_pattern, categorize_transaction,
    merchant_prefix, normalize_merchant, suggest_rules, RuleSuggestion,
};
