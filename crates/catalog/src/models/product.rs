//! Product domain types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orchard_core::{CategoryId, InventoryStatus, ListPrice, ProductId, Slug};

use crate::validate::{
    Validate, ValidationErrors, check_non_negative, check_non_negative_i32, check_opt_str_max,
    check_str_len,
};

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    #[serde(default)]
    pub alt: String,
    /// Whether this is the primary listing image.
    #[serde(default)]
    pub is_primary: bool,
    /// Sort position in the gallery.
    #[serde(default)]
    pub order: i32,
}

/// A purchasable variant of a product (e.g. a size/color combination).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant SKU.
    pub sku: String,
    /// Option attributes, e.g. `size -> "XL"`.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Variant price in the product's currency.
    pub price: Decimal,
    /// Units on hand for this variant.
    pub stock_quantity: i32,
}

/// Stock-keeping state for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Units on hand.
    pub stock_quantity: i32,
    /// Threshold below which the product counts as low stock.
    pub low_stock_threshold: i32,
    /// Availability status.
    pub status: InventoryStatus,
    /// Warehouse identifier.
    #[serde(default)]
    pub warehouse: Option<String>,
}

impl Inventory {
    /// Default low-stock threshold.
    pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

    /// Whether stock has dropped below the low-stock threshold.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock_quantity < self.low_stock_threshold
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            stock_quantity: 0,
            low_stock_threshold: Self::DEFAULT_LOW_STOCK_THRESHOLD,
            status: InventoryStatus::default(),
            warehouse: None,
        }
    }
}

/// Aggregated review ratings for a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Mean rating in `[0, 5]`; 0 when there are no reviews.
    pub average: Decimal,
    /// Number of reviews.
    pub count: i64,
}

/// A sellable product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Unique stock-keeping unit.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Unique URL slug.
    pub slug: Slug,
    /// Full description.
    pub description: Option<String>,
    /// Short listing description.
    pub short_description: Option<String>,
    /// List price.
    pub price: ListPrice,
    /// Gallery images.
    pub images: Vec<ProductImage>,
    /// Stock state.
    pub inventory: Inventory,
    /// Categories this product belongs to.
    pub category_ids: Vec<CategoryId>,
    /// Free-form attributes.
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Purchasable variants, in display order.
    pub variants: Vec<ProductVariant>,
    /// Aggregated ratings.
    pub ratings: RatingSummary,
    /// Search tags.
    pub tags: Vec<String>,
    /// Whether the product is visible.
    pub is_active: bool,
    /// Whether the product is featured.
    pub is_featured: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The primary image, falling back to the first gallery entry.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images
            .iter()
            .find(|img| img.is_primary)
            .or_else(|| self.images.first())
    }
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: ListPrice,
    pub images: Vec<ProductImage>,
    pub inventory: Inventory,
    pub category_ids: Vec<CategoryId>,
    pub attributes: BTreeMap<String, serde_json::Value>,
    pub variants: Vec<ProductVariant>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
}

impl NewProduct {
    /// Create input with defaults, deriving the slug from the name.
    #[must_use]
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price: ListPrice) -> Self {
        let name = name.into();
        let slug = Slug::from_name(&name);
        Self {
            sku: sku.into(),
            name,
            slug,
            description: None,
            short_description: None,
            price,
            images: Vec::new(),
            inventory: Inventory::default(),
            category_ids: Vec::new(),
            attributes: BTreeMap::new(),
            variants: Vec::new(),
            tags: Vec::new(),
            is_active: true,
            is_featured: false,
        }
    }
}

impl Validate for NewProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_str_len(&mut errors, "sku", &self.sku, 3, 50);
        check_str_len(&mut errors, "name", &self.name, 3, 200);
        check_opt_str_max(&mut errors, "description", self.description.as_deref(), 5000);
        check_opt_str_max(
            &mut errors,
            "short_description",
            self.short_description.as_deref(),
            200,
        );

        check_non_negative(&mut errors, "price.regular", self.price.regular);
        if let Some(sale) = self.price.sale {
            check_non_negative(&mut errors, "price.sale", sale);
        }

        check_non_negative_i32(
            &mut errors,
            "inventory.stock_quantity",
            self.inventory.stock_quantity,
        );

        for (i, variant) in self.variants.iter().enumerate() {
            if variant.sku.trim().is_empty() {
                errors.push(format!("variants[{i}].sku"), "variant sku is required");
            }
            check_non_negative(&mut errors, &format!("variants[{i}].price"), variant.price);
            check_non_negative_i32(
                &mut errors,
                &format!("variants[{i}].stock_quantity"),
                variant.stock_quantity,
            );
        }

        errors.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use orchard_core::CurrencyCode;

    fn trowel() -> NewProduct {
        NewProduct::new(
            "TRL-001",
            "Hand Trowel",
            ListPrice::regular(Decimal::from(12), CurrencyCode::USD),
        )
    }

    #[test]
    fn test_validate_ok() {
        assert!(trowel().validate().is_ok());
    }

    #[test]
    fn test_validate_sku_too_short() {
        let mut new = trowel();
        new.sku = "AB".to_owned();
        let err = new.validate().unwrap_err();
        assert_eq!(err.errors()[0].field, "sku");
    }

    #[test]
    fn test_validate_negative_price() {
        let mut new = trowel();
        new.price.regular = Decimal::from(-5);
        let err = new.validate().unwrap_err();
        assert_eq!(err.errors()[0].field, "price.regular");
    }

    #[test]
    fn test_validate_variant_fields() {
        let mut new = trowel();
        new.variants.push(ProductVariant {
            sku: String::new(),
            attributes: BTreeMap::new(),
            price: Decimal::from(-1),
            stock_quantity: -2,
        });
        let err = new.validate().unwrap_err();
        let fields: Vec<_> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "variants[0].sku",
                "variants[0].price",
                "variants[0].stock_quantity"
            ]
        );
    }

    #[test]
    fn test_primary_image_fallback() {
        let new = trowel();
        let mut product = Product {
            id: ProductId::new(1),
            sku: new.sku,
            name: new.name,
            slug: new.slug,
            description: None,
            short_description: None,
            price: new.price,
            images: vec![
                ProductImage {
                    url: "a.jpg".to_owned(),
                    alt: String::new(),
                    is_primary: false,
                    order: 0,
                },
                ProductImage {
                    url: "b.jpg".to_owned(),
                    alt: String::new(),
                    is_primary: true,
                    order: 1,
                },
            ],
            inventory: Inventory::default(),
            category_ids: Vec::new(),
            attributes: BTreeMap::new(),
            variants: Vec::new(),
            ratings: RatingSummary::default(),
            tags: Vec::new(),
            is_active: true,
            is_featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(product.primary_image().unwrap().url, "b.jpg");

        for img in &mut product.images {
            img.is_primary = false;
        }
        assert_eq!(product.primary_image().unwrap().url, "a.jpg");
    }

    #[test]
    fn test_low_stock() {
        let mut inv = Inventory::default();
        assert!(inv.is_low_stock());
        inv.stock_quantity = 25;
        assert!(!inv.is_low_stock());
    }
}
