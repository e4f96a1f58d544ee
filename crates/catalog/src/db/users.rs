//! User repository.
//!
//! The credential is hashed exactly once, in [`UserRepository::create`] and
//! [`UserRepository::change_password`]; every other update leaves the stored
//! digest untouched, so re-saving a record never re-hashes it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::{Email, OrderId, ProductId, UserId, UserRole};

use super::{RepositoryError, conflict_on_unique, from_jsonb, to_jsonb};
use crate::error::CatalogError;
use crate::lifecycle;
use crate::models::{NewUser, User, UserAddress, UserProfile};
use crate::validate::Validate;

const USER_COLUMNS: &str = "id, email, password_hash, profile, addresses, order_history, \
     wishlist, is_active, role, created_at, updated_at";

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    profile: serde_json::Value,
    addresses: serde_json::Value,
    order_history: Vec<i64>,
    wishlist: Vec<i64>,
    is_active: bool,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: UserRole = row.role.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            password_hash: row.password_hash,
            profile: from_jsonb(row.profile, "user profile")?,
            addresses: from_jsonb(row.addresses, "user addresses")?,
            order_history: row.order_history.into_iter().map(OrderId::new).collect(),
            wishlist: row.wishlist.into_iter().map(ProductId::new).collect(),
            is_active: row.is_active,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register a user, hashing the supplied plaintext password.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if field constraints fail.
    /// Returns `CatalogError::Credential` if the password is too weak.
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(&self, new: &NewUser) -> Result<User, CatalogError> {
        new.validate()?;

        let mut credential = new.password.clone();
        lifecycle::user_before_save(&mut credential, true)?;

        let sql = format!(
            "INSERT INTO account (email, password_hash, profile, addresses, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(new.email.as_str())
            .bind(&credential)
            .bind(to_jsonb(&new.profile)?)
            .bind(to_jsonb(&new.addresses)?)
            .bind(new.role.to_string())
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "email already exists"))?;

        Ok(row.try_into()?)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM account WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM account WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Change a user's password, hashing the new plaintext.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Credential` if the password is too weak.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn change_password(
        &self,
        id: UserId,
        new_password: &str,
    ) -> Result<(), CatalogError> {
        let mut credential = new_password.to_owned();
        lifecycle::user_before_save(&mut credential, true)?;

        let result =
            sqlx::query("UPDATE account SET password_hash = $2, updated_at = now() WHERE id = $1")
                .bind(id.as_i64())
                .bind(&credential)
                .execute(self.pool)
                .await
                .map_err(RepositoryError::Database)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound.into());
        }

        Ok(())
    }

    /// Update profile fields. Never touches the stored credential.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if field constraints fail.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        id: UserId,
        profile: &UserProfile,
    ) -> Result<User, CatalogError> {
        profile.validate()?;

        let sql = format!(
            "UPDATE account SET profile = $2, updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_i64())
            .bind(to_jsonb(profile)?)
            .fetch_optional(self.pool)
            .await
            .map_err(RepositoryError::Database)?;

        let row = row.ok_or(RepositoryError::NotFound)?;
        Ok(User::try_from(row)?)
    }

    /// Add an address to a user's account.
    ///
    /// A new default address clears the default flag on the others.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if field constraints fail.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn add_address(
        &self,
        id: UserId,
        address: UserAddress,
    ) -> Result<User, CatalogError> {
        address.validate()?;

        let user = self.get(id).await?.ok_or(RepositoryError::NotFound)?;

        let mut addresses = user.addresses;
        if address.is_default {
            for existing in &mut addresses {
                existing.is_default = false;
            }
        }
        addresses.push(address);

        let sql = format!(
            "UPDATE account SET addresses = $2, updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_i64())
            .bind(to_jsonb(&addresses)?)
            .fetch_one(self.pool)
            .await
            .map_err(RepositoryError::Database)?;

        Ok(User::try_from(row)?)
    }

    /// Record an order in the user's history (set semantics; re-adding an
    /// order is a no-op).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn add_order_to_history(
        &self,
        id: UserId,
        order_id: OrderId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE account \
             SET order_history = array_append(order_history, $2), updated_at = now() \
             WHERE id = $1 AND NOT ($2 = ANY(order_history))",
        )
        .bind(id.as_i64())
        .bind(order_id.as_i64())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 && self.get(id).await?.is_none() {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Add a product to the user's wishlist (set semantics).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn add_to_wishlist(
        &self,
        id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE account \
             SET wishlist = array_append(wishlist, $2), updated_at = now() \
             WHERE id = $1 AND NOT ($2 = ANY(wishlist))",
        )
        .bind(id.as_i64())
        .bind(product_id.as_i64())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 && self.get(id).await?.is_none() {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Remove a product from the user's wishlist; absent products are a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn remove_from_wishlist(
        &self,
        id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE account \
             SET wishlist = array_remove(wishlist, $2), updated_at = now() \
             WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(product_id.as_i64())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
