//! Review repository.
//!
//! Enforces one review per (user, product) via the compound unique index,
//! and derives the `verified` flag from the order linkage at every save
//! through [`crate::lifecycle::review_before_save`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::{OrderId, ProductId, ReviewId, UserId};

use super::{RepositoryError, conflict_on_unique, from_jsonb, to_jsonb};
use crate::error::CatalogError;
use crate::lifecycle;
use crate::models::{HelpfulVotes, NewReview, Review};
use crate::validate::Validate;

const REVIEW_COLUMNS: &str = "id, product_id, user_id, order_id, rating, title, comment, \
     images, verified, helpful, response, is_approved, is_reported, created_at, updated_at";

/// Internal row type for `PostgreSQL` review queries.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    product_id: i64,
    user_id: i64,
    order_id: Option<i64>,
    rating: i32,
    title: Option<String>,
    comment: String,
    images: Vec<String>,
    verified: bool,
    helpful: serde_json::Value,
    response: Option<serde_json::Value>,
    is_approved: bool,
    is_reported: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            order_id: row.order_id.map(OrderId::new),
            rating: row.rating,
            title: row.title,
            comment: row.comment,
            images: row.images,
            verified: row.verified,
            helpful: from_jsonb(row.helpful, "review helpful votes")?,
            response: row
                .response
                .map(|value| from_jsonb(value, "review response"))
                .transpose()?,
            is_approved: row.is_approved,
            is_reported: row.is_reported,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Post a review.
    ///
    /// A review created with an order linkage is verified from the start.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if field constraints fail.
    /// Returns `RepositoryError::Conflict` if this user already reviewed
    /// this product.
    pub async fn create(&self, new: &NewReview) -> Result<Review, CatalogError> {
        new.validate()?;

        let mut verified = false;
        lifecycle::review_before_save(new.order_id, &mut verified);

        let sql = format!(
            "INSERT INTO review \
                 (product_id, user_id, order_id, rating, title, comment, images, verified, \
                  helpful) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {REVIEW_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(new.product_id.as_i64())
            .bind(new.user_id.as_i64())
            .bind(new.order_id.map(|id| id.as_i64()))
            .bind(new.rating)
            .bind(new.title.as_deref())
            .bind(new.comment.trim())
            .bind(&new.images)
            .bind(verified)
            .bind(to_jsonb(&HelpfulVotes::default())?)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "user has already reviewed this product"))?;

        Ok(row.try_into()?)
    }

    /// Get a review by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM review WHERE id = $1");
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        row.map(Review::try_from).transpose()
    }

    /// Get a user's review of a product, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user_and_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<Review>, RepositoryError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM review WHERE user_id = $1 AND product_id = $2"
        );
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(user_id.as_i64())
            .bind(product_id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        row.map(Review::try_from).transpose()
    }

    /// List reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM review \
             WHERE product_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(product_id.as_i64())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    /// Link a review to an order, deriving the verified flag.
    ///
    /// The flag is monotonic: linking can only turn it on.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn link_order(
        &self,
        id: ReviewId,
        order_id: OrderId,
    ) -> Result<Review, RepositoryError> {
        let review = self.get(id).await?.ok_or(RepositoryError::NotFound)?;

        let mut verified = review.verified;
        lifecycle::review_before_save(Some(order_id), &mut verified);

        let sql = format!(
            "UPDATE review SET order_id = $2, verified = $3, updated_at = now() \
             WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id.as_i64())
            .bind(order_id.as_i64())
            .bind(verified)
            .fetch_one(self.pool)
            .await?;

        row.try_into()
    }

    /// Record that a user found a review helpful.
    ///
    /// One vote per user; repeat votes are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn mark_helpful(
        &self,
        id: ReviewId,
        user_id: UserId,
    ) -> Result<Review, CatalogError> {
        let review = self.get(id).await?.ok_or(RepositoryError::NotFound)?;

        let mut helpful = review.helpful.clone();
        if helpful.user_ids.contains(&user_id) {
            return Ok(review);
        }
        helpful.user_ids.push(user_id);
        helpful.count = i64::try_from(helpful.user_ids.len()).unwrap_or(i64::MAX);

        let sql = format!(
            "UPDATE review SET helpful = $2, updated_at = now() \
             WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id.as_i64())
            .bind(to_jsonb(&helpful)?)
            .fetch_one(self.pool)
            .await
            .map_err(RepositoryError::Database)?;

        Ok(Review::try_from(row)?)
    }

    /// Set the moderation approval flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn set_approved(&self, id: ReviewId, approved: bool) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE review SET is_approved = $2, updated_at = now() WHERE id = $1")
                .bind(id.as_i64())
                .bind(approved)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
