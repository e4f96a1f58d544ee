//! Category ancestor/level maintenance.
//!
//! Every category denormalizes its ancestry: `ancestors` is exactly the
//! parent's `ancestors` with the parent's own ID appended, and `level` is
//! the parent's level plus one (0 for a root). The category repository
//! recomputes these fields whenever a category is created or re-parented;
//! saves that leave `parent_id` untouched never recompute them.
//!
//! No cycle detection is performed; callers must keep the reference graph a
//! forest. A parent chain containing a cycle would not terminate if walked.

use orchard_core::CategoryId;

use crate::models::Category;

/// The denormalized placement of a category within the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ancestry {
    /// All strict ancestors, root first, immediate parent last.
    pub ancestors: Vec<CategoryId>,
    /// Tree depth; root = 0.
    pub level: i32,
}

impl Ancestry {
    /// Placement of a root category.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            ancestors: Vec::new(),
            level: 0,
        }
    }
}

/// The resolved parent of a category being saved.
#[derive(Debug, Clone, Copy)]
pub enum ParentRef<'a> {
    /// No parent: the category is a root.
    Root,
    /// The parent record was found.
    Found(&'a Category),
    /// `parent_id` was set but does not resolve to an existing record.
    Dangling(CategoryId),
}

/// Compute the placement implied by a resolved parent.
///
/// Returns `None` for a dangling parent reference: the save proceeds with
/// the placement it already had. The dangling case is logged by
/// [`crate::lifecycle::category_before_save`].
#[must_use]
pub fn resolve_ancestry(parent: ParentRef<'_>) -> Option<Ancestry> {
    match parent {
        ParentRef::Root => Some(Ancestry::root()),
        ParentRef::Found(parent) => {
            let mut ancestors = Vec::with_capacity(parent.ancestors.len() + 1);
            ancestors.extend_from_slice(&parent.ancestors);
            ancestors.push(parent.id);
            Some(Ancestry {
                ancestors,
                level: parent.level + 1,
            })
        }
        ParentRef::Dangling(_) => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use orchard_core::Slug;

    use crate::models::CategoryMetadata;

    fn category(id: i64, ancestors: &[i64], level: i32) -> Category {
        Category {
            id: CategoryId::new(id),
            name: format!("Category {id}"),
            slug: Slug::from_name(&format!("Category {id}")),
            description: None,
            parent_id: ancestors.last().map(|&p| CategoryId::new(p)),
            ancestors: ancestors.iter().map(|&a| CategoryId::new(a)).collect(),
            level,
            image: None,
            metadata: CategoryMetadata::default(),
            display_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_root_placement() {
        let placement = resolve_ancestry(ParentRef::Root).unwrap();
        assert!(placement.ancestors.is_empty());
        assert_eq!(placement.level, 0);
    }

    #[test]
    fn test_child_of_root() {
        let root = category(1, &[], 0);
        let placement = resolve_ancestry(ParentRef::Found(&root)).unwrap();
        assert_eq!(placement.ancestors, vec![CategoryId::new(1)]);
        assert_eq!(placement.level, 1);
    }

    #[test]
    fn test_ancestors_are_parents_plus_parent_id() {
        // grandparent(1) -> parent(2) -> child
        let parent = category(2, &[1], 1);
        let placement = resolve_ancestry(ParentRef::Found(&parent)).unwrap();
        assert_eq!(
            placement.ancestors,
            vec![CategoryId::new(1), CategoryId::new(2)]
        );
        assert_eq!(placement.level, parent.level + 1);
    }

    #[test]
    fn test_deep_chain_invariant() {
        let mut parent = category(1, &[], 0);
        for id in 2..=6 {
            let placement = resolve_ancestry(ParentRef::Found(&parent)).unwrap();
            assert_eq!(placement.level, parent.level + 1);
            assert_eq!(
                placement.ancestors.last().copied(),
                Some(parent.id),
                "immediate parent is the last ancestor"
            );

            let ancestor_ids: Vec<i64> =
                placement.ancestors.iter().map(|a| a.as_i64()).collect();
            parent = category(id, &ancestor_ids, placement.level);
        }
        assert_eq!(parent.level, 5);
        assert_eq!(parent.ancestors.len(), 5);
    }

    #[test]
    fn test_dangling_parent_yields_no_placement() {
        assert!(resolve_ancestry(ParentRef::Dangling(CategoryId::new(404))).is_none());
    }
}
