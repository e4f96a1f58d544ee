//! Product repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::{CategoryId, ProductId, Slug};

use super::{RepositoryError, conflict_on_unique, from_jsonb, to_jsonb};
use crate::error::CatalogError;
use crate::models::{NewProduct, Product, RatingSummary};
use crate::validate::Validate;

const PRODUCT_COLUMNS: &str = "id, sku, name, slug, description, short_description, price, \
     images, inventory, category_ids, attributes, variants, ratings, tags, is_active, \
     is_featured, created_at, updated_at";

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    sku: String,
    name: String,
    slug: String,
    description: Option<String>,
    short_description: Option<String>,
    price: serde_json::Value,
    images: serde_json::Value,
    inventory: serde_json::Value,
    category_ids: Vec<i64>,
    attributes: serde_json::Value,
    variants: serde_json::Value,
    ratings: serde_json::Value,
    tags: Vec<String>,
    is_active: bool,
    is_featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            sku: row.sku,
            name: row.name,
            slug,
            description: row.description,
            short_description: row.short_description,
            price: from_jsonb(row.price, "product price")?,
            images: from_jsonb(row.images, "product images")?,
            inventory: from_jsonb(row.inventory, "product inventory")?,
            category_ids: row.category_ids.into_iter().map(CategoryId::new).collect(),
            attributes: from_jsonb(row.attributes, "product attributes")?,
            variants: from_jsonb(row.variants, "product variants")?,
            ratings: from_jsonb(row.ratings, "product ratings")?,
            tags: row.tags,
            is_active: row.is_active,
            is_featured: row.is_featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if field constraints fail.
    /// Returns `RepositoryError::Conflict` if the sku or slug already exists.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, CatalogError> {
        new.validate()?;

        let category_ids: Vec<i64> = new.category_ids.iter().map(CategoryId::as_i64).collect();

        let sql = format!(
            "INSERT INTO product \
                 (sku, name, slug, description, short_description, price, images, inventory, \
                  category_ids, attributes, variants, ratings, tags, is_active, is_featured) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(new.sku.trim())
            .bind(new.name.trim())
            .bind(new.slug.as_str())
            .bind(new.description.as_deref())
            .bind(new.short_description.as_deref())
            .bind(to_jsonb(&new.price)?)
            .bind(to_jsonb(&new.images)?)
            .bind(to_jsonb(&new.inventory)?)
            .bind(&category_ids)
            .bind(to_jsonb(&new.attributes)?)
            .bind(to_jsonb(&new.variants)?)
            .bind(to_jsonb(&RatingSummary::default())?)
            .bind(&new.tags)
            .bind(new.is_active)
            .bind(new.is_featured)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "product sku or slug already exists"))?;

        Ok(row.try_into()?)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE slug = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(slug.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Get a product by its SKU.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE sku = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(sku)
            .fetch_optional(self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// List active products in a category, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM product \
             WHERE category_ids @> ARRAY[$1]::BIGINT[] AND is_active \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(category_id.as_i64())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Set the top-level stock quantity.
    ///
    /// Only the quantity changes; availability status is an independent
    /// field and is not derived from it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_stock(
        &self,
        id: ProductId,
        stock_quantity: i32,
    ) -> Result<Product, CatalogError> {
        let product = self.get(id).await?.ok_or(RepositoryError::NotFound)?;

        let mut inventory = product.inventory;
        inventory.stock_quantity = stock_quantity.max(0);

        let sql = format!(
            "UPDATE product SET inventory = $2, updated_at = now() \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.as_i64())
            .bind(to_jsonb(&inventory)?)
            .fetch_one(self.pool)
            .await
            .map_err(RepositoryError::Database)?;

        Ok(Product::try_from(row)?)
    }

    /// Replace the aggregated rating summary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_ratings(
        &self,
        id: ProductId,
        ratings: RatingSummary,
    ) -> Result<(), CatalogError> {
        let result = sqlx::query("UPDATE product SET ratings = $2, updated_at = now() WHERE id = $1")
            .bind(id.as_i64())
            .bind(to_jsonb(&ratings)?)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::Database)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound.into());
        }

        Ok(())
    }
}
