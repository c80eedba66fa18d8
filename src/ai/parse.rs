//! Tolerant parsing of provider classification responses
//!
//! Models wrap their JSON in prose or code fences often enough that the
//! parser extracts the first top-level bracketed array it can find. A
//! response that yields nothing parseable is a no-op, not an error; invalid
//! entries are dropped individually while the rest of the batch applies.

use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::models::{CategoryId, TransactionId};

/// Minimum confidence for a classification to be applied
pub const ACCEPT_THRESHOLD: f64 = 0.7;

/// Minimum confidence for a classification to also learn a rule
pub const AUTO_RULE_THRESHOLD: f64 = 0.9;

/// One validated classification from the AI tier
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category_id: CategoryId,
    /// Clamped to `[0, 1]`
    pub confidence: f64,
}

/// Parse a raw provider response into validated classifications
///
/// `valid_ids` is the category domain; entries naming any other category are
/// dropped. Callers must include `uncategorized` in the set, since the
/// prompt instructs the model to use it for payroll-style deposits.
pub fn parse_classifications(
    raw: &str,
    valid_ids: &HashSet<CategoryId>,
) -> HashMap<TransactionId, Classification> {
    let mut result = HashMap::new();

    // First '[' through last ']' covers prose and code-fence wrapping.
    let Some(start) = raw.find('[') else {
        return result;
    };
    let Some(end) = raw.rfind(']') else {
        return result;
    };
    if end < start {
        return result;
    }

    let Ok(parsed) = serde_json::from_str::<Value>(&raw[start..=end]) else {
        return result;
    };
    let Some(entries) = parsed.as_array() else {
        return result;
    };

    for entry in entries {
        let Some(id) = entry.get("id").and_then(Value::as_str) else {
            continue;
        };
        let Some(category) = entry.get("categoryId").and_then(Value::as_str) else {
            continue;
        };
        let Some(confidence) = entry.get("confidence").and_then(Value::as_f64) else {
            continue;
        };

        let category_id = CategoryId::new(category);
        if !valid_ids.contains(&category_id) {
            continue;
        }

        result.insert(
            TransactionId::new(id),
            Classification {
                category_id,
                confidence: confidence.clamp(0.0, 1.0),
            },
        );
    }

    result
}
