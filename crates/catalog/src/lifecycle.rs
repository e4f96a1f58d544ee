//! Explicit persistence lifecycle hooks.
//!
//! The repositories invoke these named functions at defined points (before
//! insert, before update). Each hook that fires conditionally takes its
//! trigger condition as an explicit parameter; nothing here runs implicitly.

use orchard_core::OrderId;
use tracing::warn;

use crate::credential::{self, CredentialError};
use crate::hierarchy::{Ancestry, ParentRef, resolve_ancestry};

/// Recompute a category's denormalized placement before a save.
///
/// Runs only when `parent_changed` is true; a save that does not touch
/// `parent_id` must leave `ancestors`/`level` exactly as they were. A
/// dangling parent reference is logged and leaves the placement unchanged:
/// the save itself still proceeds.
pub fn category_before_save(
    placement: &mut Ancestry,
    parent_changed: bool,
    parent: ParentRef<'_>,
) {
    if !parent_changed {
        return;
    }

    match resolve_ancestry(parent) {
        Some(resolved) => *placement = resolved,
        None => {
            if let ParentRef::Dangling(parent_id) = parent {
                warn!(%parent_id, "category parent does not resolve; keeping existing ancestry");
            }
        }
    }
}

/// Hash the credential before a user save, only when it changed.
///
/// `credential` holds plaintext when `password_changed` is true and the
/// stored digest otherwise; re-saving a record without touching the
/// credential never re-hashes. An already-hashed value is refused rather
/// than hashed twice.
///
/// # Errors
///
/// Returns `CredentialError::WeakPassword` for a too-short password and
/// `CredentialError::Hash` if the hasher fails.
pub fn user_before_save(
    credential: &mut String,
    password_changed: bool,
) -> Result<(), CredentialError> {
    if !password_changed {
        return Ok(());
    }

    if credential::is_hashed(credential) {
        return Ok(());
    }

    credential::validate_password(credential)?;
    *credential = credential::hash_password(credential)?;
    Ok(())
}

/// Derive a review's `verified` flag before a save.
///
/// Forces `verified` to true when the review carries an order linkage and is
/// not already verified; never clears an existing true. Monotonic.
pub fn review_before_save(order_id: Option<OrderId>, verified: &mut bool) {
    if order_id.is_some() && !*verified {
        *verified = true;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use orchard_core::{CategoryId, Slug};

    use crate::credential::verify_password;
    use crate::models::{Category, CategoryMetadata};

    fn parent_category() -> Category {
        Category {
            id: CategoryId::new(7),
            name: "Outdoor".to_owned(),
            slug: Slug::from_name("Outdoor"),
            description: None,
            parent_id: None,
            ancestors: vec![CategoryId::new(3)],
            level: 1,
            image: None,
            metadata: CategoryMetadata::default(),
            display_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_category_hook_skips_when_parent_unchanged() {
        let mut placement = Ancestry {
            ancestors: vec![CategoryId::new(99)],
            level: 1,
        };
        let parent = parent_category();
        category_before_save(&mut placement, false, ParentRef::Found(&parent));
        assert_eq!(placement.ancestors, vec![CategoryId::new(99)]);
        assert_eq!(placement.level, 1);
    }

    #[test]
    fn test_category_hook_applies_parent() {
        let mut placement = Ancestry::root();
        let parent = parent_category();
        category_before_save(&mut placement, true, ParentRef::Found(&parent));
        assert_eq!(
            placement.ancestors,
            vec![CategoryId::new(3), CategoryId::new(7)]
        );
        assert_eq!(placement.level, 2);
    }

    #[test]
    fn test_category_hook_resets_to_root() {
        let mut placement = Ancestry {
            ancestors: vec![CategoryId::new(3), CategoryId::new(7)],
            level: 2,
        };
        category_before_save(&mut placement, true, ParentRef::Root);
        assert_eq!(placement, Ancestry::root());
    }

    #[test]
    fn test_category_hook_dangling_parent_is_a_noop() {
        let original = Ancestry {
            ancestors: vec![CategoryId::new(3)],
            level: 1,
        };
        let mut placement = original.clone();
        category_before_save(&mut placement, true, ParentRef::Dangling(CategoryId::new(404)));
        assert_eq!(placement, original);
    }

    #[test]
    fn test_user_hook_hashes_on_change() {
        let mut credential = "orchard-rocks".to_owned();
        user_before_save(&mut credential, true).unwrap();
        assert_ne!(credential, "orchard-rocks");
        assert!(verify_password("orchard-rocks", &credential).unwrap());
    }

    #[test]
    fn test_user_hook_is_idempotent_on_noop_saves() {
        let mut credential = "orchard-rocks".to_owned();
        user_before_save(&mut credential, true).unwrap();
        let digest = credential.clone();

        // Save again without touching the credential.
        user_before_save(&mut credential, false).unwrap();
        assert_eq!(credential, digest);

        // Even a save that claims a change must not double-hash a digest.
        user_before_save(&mut credential, true).unwrap();
        assert_eq!(credential, digest);
    }

    #[test]
    fn test_user_hook_rejects_weak_password() {
        let mut credential = "short".to_owned();
        assert!(matches!(
            user_before_save(&mut credential, true),
            Err(CredentialError::WeakPassword(_))
        ));
        assert_eq!(credential, "short");
    }

    #[test]
    fn test_review_hook_sets_verified_with_linkage() {
        let mut verified = false;
        review_before_save(Some(OrderId::new(1)), &mut verified);
        assert!(verified);
    }

    #[test]
    fn test_review_hook_never_clears_verified() {
        let mut verified = true;
        review_before_save(None, &mut verified);
        assert!(verified);
    }

    #[test]
    fn test_review_hook_without_linkage_stays_unverified() {
        let mut verified = false;
        review_before_save(None, &mut verified);
        assert!(!verified);
    }
}
