//! Spending categories and the default set seeded into a fresh vault

use serde::{Deserialize, Serialize};

use super::ids::CategoryId;

/// A spending category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Slug identifier, e.g. `groceries`
    pub id: CategoryId,
    /// Display name
    pub name: String,
    /// Display color (hex)
    pub color: String,
    /// Whether this category was part of the seeded defaults
    #[serde(default)]
    pub is_default: bool,
}

impl Category {
    /// Create a non-default (user-added) category
    pub fn custom(id: CategoryId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            is_default: false,
        }
    }
}

/// Color palette cycled through for user-added categories
pub const CATEGORY_PALETTE: [&str; 5] = ["#A8D8EA", "#AA96DA", "#FCBAD3", "#B5EAD7", "#FBC687"];

/// The category set seeded into every new vault
pub fn default_categories() -> Vec<Category> {
    let defaults = [
        ("groceries", "Groceries", "#A8D8EA"),
        ("housing", "Housing", "#AA96DA"),
        ("utilities", "Utilities", "#FCBAD3"),
        ("transport", "Transport", "#FBC687"),
        ("dining", "Dining", "#B5EAD7"),
        ("health", "Health", "#C7CEEA"),
        ("shopping", "Shopping", "#FFDAC1"),
        ("entertainment", "Fun", "#E2F0CB"),
        ("uncategorized", "Uncategorized", "#E6E6EA"),
    ];
    defaults
        .iter()
        .map(|(id, name, color)| Category {
            id: CategoryId::new(*id),
            name: name.to_string(),
            color: color.to_string(),
            is_default: true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_include_uncategorized() {
        let cats = default_categories();
        assert!(cats.iter().any(|c| c.id.is_uncategorized()));
        assert!(cats.iter().all(|c| c.is_default));
    }

    #[test]
    fn test_custom_category() {
        let cat = Category::custom(CategoryId::from_name("Pet Care"), "Pet Care", "#A8D8EA");
        assert_eq!(cat.id.as_str(), "pet-care");
        assert!(!cat.is_default);
    }
}
