//! Category repository.
//!
//! Maintains the denormalized `ancestors`/`level` fields: they are
//! recomputed on insert and on re-parenting, and only then. Updates that do
//! not touch `parent_id` go through [`CategoryRepository::update_info`],
//! which never recomputes placement.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::{CategoryId, Slug};

use super::{RepositoryError, conflict_on_unique, from_jsonb, to_jsonb};
use crate::error::CatalogError;
use crate::hierarchy::{Ancestry, ParentRef};
use crate::lifecycle;
use crate::models::{Category, NewCategory, UpdateCategory};
use crate::validate::Validate;

const CATEGORY_COLUMNS: &str = "id, name, slug, description, parent_id, ancestors, level, \
     image, metadata, display_order, is_active, created_at, updated_at";

/// Internal row type for `PostgreSQL` category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    parent_id: Option<i64>,
    ancestors: Vec<i64>,
    level: i32,
    image: Option<String>,
    metadata: serde_json::Value,
    display_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;

        Ok(Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug,
            description: row.description,
            parent_id: row.parent_id.map(CategoryId::new),
            ancestors: row.ancestors.into_iter().map(CategoryId::new).collect(),
            level: row.level,
            image: row.image,
            metadata: from_jsonb(row.metadata, "category metadata")?,
            display_order: row.display_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a category, computing its ancestry from the referenced parent.
    ///
    /// A `parent_id` that does not resolve is logged and the category is
    /// stored with root placement; the write itself still succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if field constraints fail.
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    pub async fn create(&self, new: &NewCategory) -> Result<Category, CatalogError> {
        new.validate()?;

        let parent_record = match new.parent_id {
            Some(parent_id) => self.get(parent_id).await?,
            None => None,
        };
        let parent_ref = match (new.parent_id, parent_record.as_ref()) {
            (None, _) => ParentRef::Root,
            (Some(_), Some(parent)) => ParentRef::Found(parent),
            (Some(parent_id), None) => ParentRef::Dangling(parent_id),
        };

        let mut placement = Ancestry::root();
        lifecycle::category_before_save(&mut placement, true, parent_ref);

        let ancestors: Vec<i64> = placement.ancestors.iter().map(CategoryId::as_i64).collect();

        let sql = format!(
            "INSERT INTO category \
                 (name, slug, description, parent_id, ancestors, level, image, metadata, \
                  display_order, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(new.name.trim())
            .bind(new.slug.as_str())
            .bind(new.description.as_deref())
            .bind(new.parent_id.map(|id| id.as_i64()))
            .bind(&ancestors)
            .bind(placement.level)
            .bind(new.image.as_deref())
            .bind(to_jsonb(&new.metadata)?)
            .bind(new.display_order)
            .bind(new.is_active)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "category slug already exists"))?;

        Ok(row.try_into()?)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM category WHERE id = $1");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        row.map(Category::try_from).transpose()
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Category>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM category WHERE slug = $1");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(slug.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(Category::try_from).transpose()
    }

    /// Move a category under a new parent (or to the root with `None`),
    /// recomputing its ancestry.
    ///
    /// When the parent is unchanged the stored placement is left exactly as
    /// it is — the recomputation runs only on an actual re-parenting. A new
    /// parent that does not resolve is logged; the parent reference is still
    /// written but the stored ancestry stays untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn set_parent(
        &self,
        id: CategoryId,
        new_parent: Option<CategoryId>,
    ) -> Result<Category, CatalogError> {
        let current = self.get(id).await?.ok_or(RepositoryError::NotFound)?;

        if current.parent_id == new_parent {
            return Ok(current);
        }

        let parent_record = match new_parent {
            Some(parent_id) => self.get(parent_id).await?,
            None => None,
        };
        let parent_ref = match (new_parent, parent_record.as_ref()) {
            (None, _) => ParentRef::Root,
            (Some(_), Some(parent)) => ParentRef::Found(parent),
            (Some(parent_id), None) => ParentRef::Dangling(parent_id),
        };

        let mut placement = Ancestry {
            ancestors: current.ancestors.clone(),
            level: current.level,
        };
        lifecycle::category_before_save(&mut placement, true, parent_ref);

        let ancestors: Vec<i64> = placement.ancestors.iter().map(CategoryId::as_i64).collect();

        let sql = format!(
            "UPDATE category \
             SET parent_id = $2, ancestors = $3, level = $4, updated_at = now() \
             WHERE id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id.as_i64())
            .bind(new_parent.map(|p| p.as_i64()))
            .bind(&ancestors)
            .bind(placement.level)
            .fetch_one(self.pool)
            .await
            .map_err(RepositoryError::Database)?;

        Ok(Category::try_from(row)?)
    }

    /// Update display fields without touching tree placement.
    ///
    /// Never recomputes `ancestors`/`level`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn update_info(
        &self,
        id: CategoryId,
        update: &UpdateCategory,
    ) -> Result<Category, CatalogError> {
        update.validate()?;

        let metadata = update.metadata.as_ref().map(to_jsonb).transpose()?;

        let sql = format!(
            "UPDATE category \
             SET name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 image = COALESCE($4, image), \
                 metadata = COALESCE($5, metadata), \
                 display_order = COALESCE($6, display_order), \
                 is_active = COALESCE($7, is_active), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id.as_i64())
            .bind(update.name.as_deref())
            .bind(update.description.as_deref())
            .bind(update.image.as_deref())
            .bind(metadata)
            .bind(update.display_order)
            .bind(update.is_active)
            .fetch_optional(self.pool)
            .await
            .map_err(RepositoryError::Database)?;

        let row = row.ok_or(RepositoryError::NotFound)?;
        Ok(Category::try_from(row)?)
    }

    /// List direct children of a parent (or the roots for `None`), ordered
    /// by display order then name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_children(
        &self,
        parent: Option<CategoryId>,
    ) -> Result<Vec<Category>, RepositoryError> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM category \
             WHERE parent_id IS NOT DISTINCT FROM $1 \
             ORDER BY display_order, name"
        );
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(parent.map(|p| p.as_i64()))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    /// List every descendant of a category, shallowest first.
    ///
    /// Uses the denormalized `ancestors` field, so a single query covers the
    /// whole subtree.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_descendants(
        &self,
        id: CategoryId,
    ) -> Result<Vec<Category>, RepositoryError> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM category \
             WHERE ancestors @> ARRAY[$1]::BIGINT[] \
             ORDER BY level, display_order, name"
        );
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id.as_i64())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    /// Delete a category.
    ///
    /// # Returns
    ///
    /// Returns `true` if the category was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
