//! Review domain types.
//!
//! One review per user per product, enforced by a compound unique index.
//! The `verified` flag is derived from the order linkage at save time and is
//! monotonic: once true, never reverted by the derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orchard_core::{OrderId, ProductId, ReviewId, UserId};

use crate::validate::{Validate, ValidationErrors, check_opt_str_max, check_range_i32};

/// Maximum number of images attachable to a review.
pub const MAX_REVIEW_IMAGES: usize = 5;

/// Helpful-vote tally for a review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpfulVotes {
    /// Number of distinct users who found the review helpful.
    pub count: i64,
    /// The users who voted; one vote each.
    pub user_ids: Vec<UserId>,
}

/// A merchant response attached to a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub text: String,
    pub responded_by: String,
    pub responded_at: DateTime<Utc>,
}

/// A customer review of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Unique review ID.
    pub id: ReviewId,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Review author.
    pub user_id: UserId,
    /// Linked purchase, when the reviewer bought the product here.
    pub order_id: Option<OrderId>,
    /// Star rating in `[1, 5]`.
    pub rating: i32,
    /// Optional headline.
    pub title: Option<String>,
    /// Review body.
    pub comment: String,
    /// Attached image URLs; at most [`MAX_REVIEW_IMAGES`].
    pub images: Vec<String>,
    /// Whether the review is provably tied to a purchase.
    pub verified: bool,
    /// Helpful-vote tally.
    pub helpful: HelpfulVotes,
    /// Merchant response, if any.
    pub response: Option<ReviewResponse>,
    /// Whether moderation approved the review.
    pub is_approved: bool,
    /// Whether the review was reported.
    pub is_reported: bool,
    /// When the review was created.
    pub created_at: DateTime<Utc>,
    /// When the review was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for posting a review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub order_id: Option<OrderId>,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: String,
    pub images: Vec<String>,
}

impl NewReview {
    /// Create input with no order linkage or images.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        user_id: UserId,
        rating: i32,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            product_id,
            user_id,
            order_id: None,
            rating,
            title: None,
            comment: comment.into(),
            images: Vec::new(),
        }
    }
}

impl Validate for NewReview {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_range_i32(&mut errors, "rating", self.rating, 1, 5);
        check_opt_str_max(&mut errors, "title", self.title.as_deref(), 100);

        let comment_len = self.comment.trim().chars().count();
        if comment_len == 0 {
            errors.push("comment", "comment is required");
        } else if !(10..=5000).contains(&comment_len) {
            errors.push("comment", "must be between 10 and 5000 characters");
        }

        if self.images.len() > MAX_REVIEW_IMAGES {
            errors.push(
                "images",
                format!("cannot upload more than {MAX_REVIEW_IMAGES} images"),
            );
        }

        errors.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn seed_review() -> NewReview {
        NewReview::new(
            ProductId::new(10),
            UserId::new(1),
            4,
            "Sturdy handle, cuts cleanly through compacted soil.",
        )
    }

    #[test]
    fn test_validate_ok() {
        assert!(seed_review().validate().is_ok());
    }

    #[test]
    fn test_validate_rating_bounds() {
        for rating in [0, 6, -1] {
            let mut new = seed_review();
            new.rating = rating;
            let err = new.validate().unwrap_err();
            assert_eq!(err.errors()[0].field, "rating");
        }
        for rating in 1..=5 {
            let mut new = seed_review();
            new.rating = rating;
            assert!(new.validate().is_ok());
        }
    }

    #[test]
    fn test_validate_comment_too_short() {
        let mut new = seed_review();
        new.comment = "Nice.".to_owned();
        let err = new.validate().unwrap_err();
        assert_eq!(err.errors()[0].field, "comment");
    }

    #[test]
    fn test_validate_image_cap() {
        let mut new = seed_review();
        new.images = (0..6).map(|i| format!("img-{i}.jpg")).collect();
        let err = new.validate().unwrap_err();
        assert_eq!(err.errors()[0].field, "images");
    }
}
