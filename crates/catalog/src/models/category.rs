//! Category domain types.
//!
//! Categories form a forest: every category holds its parent reference plus
//! a denormalized `ancestors` list (root to immediate parent) and its tree
//! depth (`level`, root = 0). The denormalized fields are maintained by the
//! category repository through [`crate::hierarchy`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orchard_core::{CategoryId, Slug};

use crate::validate::{Validate, ValidationErrors, check_opt_str_max, check_str_len};

/// SEO metadata embedded in a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMetadata {
    /// Page title override.
    #[serde(default)]
    pub title: Option<String>,
    /// Meta description.
    #[serde(default)]
    pub meta_description: Option<String>,
    /// Search keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A named node in the category tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Unique URL slug.
    pub slug: Slug,
    /// Longer description.
    pub description: Option<String>,
    /// Immediate parent, if any.
    pub parent_id: Option<CategoryId>,
    /// All strict ancestors, ordered root first, immediate parent last.
    pub ancestors: Vec<CategoryId>,
    /// Tree depth; a root category is level 0.
    pub level: i32,
    /// Image URL.
    pub image: Option<String>,
    /// SEO metadata.
    pub metadata: CategoryMetadata,
    /// Sort position among siblings.
    pub display_order: i32,
    /// Whether the category is visible.
    pub is_active: bool,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Whether this category sits at the root of the tree.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Input for creating a category. Ancestry is computed at insert time.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub image: Option<String>,
    pub metadata: CategoryMetadata,
    pub display_order: i32,
    pub is_active: bool,
}

impl NewCategory {
    /// Create input with defaults, deriving the slug from the name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = Slug::from_name(&name);
        Self {
            name,
            slug,
            description: None,
            parent_id: None,
            image: None,
            metadata: CategoryMetadata::default(),
            display_order: 0,
            is_active: true,
        }
    }

    /// Place this category under a parent.
    #[must_use]
    pub fn under(mut self, parent_id: CategoryId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

impl Validate for NewCategory {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_str_len(&mut errors, "name", &self.name, 2, 100);
        check_opt_str_max(&mut errors, "description", self.description.as_deref(), 1000);
        errors.into_result()
    }
}

/// Fields updatable without touching tree placement.
///
/// Saves built from this type never recompute `ancestors`/`level`; moving a
/// category is a separate repository operation.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub metadata: Option<CategoryMetadata>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl Validate for UpdateCategory {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = self.name.as_deref() {
            check_str_len(&mut errors, "name", name, 2, 100);
        }
        check_opt_str_max(&mut errors, "description", self.description.as_deref(), 1000);
        errors.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_slug() {
        let new = NewCategory::new("Garden Tools");
        assert_eq!(new.slug.as_str(), "garden-tools");
        assert!(new.is_active);
        assert!(new.parent_id.is_none());
    }

    #[test]
    fn test_validate_name_length() {
        let new = NewCategory::new("G");
        let err = new.validate().unwrap_err();
        assert_eq!(err.errors()[0].field, "name");
    }

    #[test]
    fn test_validate_description_cap() {
        let mut new = NewCategory::new("Garden Tools");
        new.description = Some("d".repeat(1001));
        let err = new.validate().unwrap_err();
        assert_eq!(err.errors()[0].field, "description");
    }

    #[test]
    fn test_validate_ok() {
        assert!(NewCategory::new("Garden Tools").validate().is_ok());
    }
}
