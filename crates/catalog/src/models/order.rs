//! Order domain types.
//!
//! An order number is assigned exactly once, at creation, by the order
//! repository; it never changes afterwards. Status transitions append to an
//! ordered, append-only history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orchard_core::{
    CurrencyCode, Email, OrderId, OrderNumber, OrderStatus, PaymentMethod, PaymentStatus,
    PhoneNumber, ProductId, UserId, VariantId,
};

use crate::validate::{
    Validate, ValidationErrors, check_non_negative, check_str_len,
};

/// One product-and-quantity entry within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product reference.
    pub product_id: ProductId,
    /// Variant reference, when a specific variant was bought.
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    /// SKU frozen at purchase time.
    pub sku: String,
    /// Product name frozen at purchase time.
    pub name: String,
    /// Units purchased; at least 1.
    pub quantity: i32,
    /// Unit price frozen at purchase time.
    pub price_at_purchase: Decimal,
    /// Per-line discount amount.
    #[serde(default)]
    pub discount: Decimal,
    /// Line total.
    pub total: Decimal,
}

impl OrderItem {
    fn validate_into(&self, errors: &mut ValidationErrors, prefix: &str) {
        if self.sku.trim().is_empty() {
            errors.push(format!("{prefix}.sku"), "sku is required");
        }
        if self.name.trim().is_empty() {
            errors.push(format!("{prefix}.name"), "name is required");
        }
        if self.quantity < 1 {
            errors.push(format!("{prefix}.quantity"), "must be at least 1");
        }
        check_non_negative(
            errors,
            &format!("{prefix}.price_at_purchase"),
            self.price_at_purchase,
        );
        check_non_negative(errors, &format!("{prefix}.discount"), self.discount);
        check_non_negative(errors, &format!("{prefix}.total"), self.total);
    }
}

/// A postal address embedded in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl PostalAddress {
    fn validate_into(&self, errors: &mut ValidationErrors, prefix: &str) {
        for (field, value) in [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zip_code", &self.zip_code),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{prefix}.{field}"), format!("{field} is required"));
            }
        }
    }
}

/// Buyer contact details frozen onto the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<PhoneNumber>,
}

/// Money breakdown for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPricing {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub total: Decimal,
    pub currency: CurrencyCode,
}

impl OrderPricing {
    fn validate_into(&self, errors: &mut ValidationErrors) {
        check_non_negative(errors, "pricing.subtotal", self.subtotal);
        check_non_negative(errors, "pricing.tax", self.tax);
        check_non_negative(errors, "pricing.shipping", self.shipping);
        check_non_negative(errors, "pricing.discount", self.discount);
        check_non_negative(errors, "pricing.total", self.total);
    }
}

/// Payment details for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Shipment details for an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_delivery: Option<DateTime<Utc>>,
}

/// One entry in an order's append-only status log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Human-readable order number, assigned once at creation.
    pub order_number: OrderNumber,
    /// The buyer.
    pub user_id: UserId,
    /// Buyer contact details.
    pub customer: CustomerInfo,
    /// Line items; never empty.
    pub items: Vec<OrderItem>,
    /// Money breakdown.
    pub pricing: OrderPricing,
    /// Where the order ships.
    pub shipping_address: PostalAddress,
    /// Where the invoice goes.
    pub billing_address: PostalAddress,
    /// Payment details.
    pub payment: PaymentInfo,
    /// Shipment details.
    pub shipping: ShippingInfo,
    /// Current fulfillment status.
    pub status: OrderStatus,
    /// Append-only status log, oldest first.
    pub status_history: Vec<StatusChange>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for placing an order.
///
/// The order number is not part of the input; the repository assigns it.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub pricing: OrderPricing,
    pub shipping_address: PostalAddress,
    pub billing_address: PostalAddress,
    pub payment: PaymentInfo,
    pub shipping: ShippingInfo,
    pub notes: Option<String>,
}

impl Validate for NewOrder {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_str_len(&mut errors, "customer.first_name", &self.customer.first_name, 1, 50);
        check_str_len(&mut errors, "customer.last_name", &self.customer.last_name, 1, 50);

        if self.items.is_empty() {
            errors.push("items", "order must have at least one item");
        }
        for (i, item) in self.items.iter().enumerate() {
            item.validate_into(&mut errors, &format!("items[{i}]"));
        }

        self.pricing.validate_into(&mut errors);
        self.shipping_address
            .validate_into(&mut errors, "shipping_address");
        self.billing_address
            .validate_into(&mut errors, "billing_address");

        errors.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address() -> PostalAddress {
        PostalAddress {
            street: "1 Orchard Way".to_owned(),
            city: "Portland".to_owned(),
            state: "OR".to_owned(),
            zip_code: "97201".to_owned(),
            country: "US".to_owned(),
        }
    }

    fn seed_order() -> NewOrder {
        NewOrder {
            user_id: UserId::new(1),
            customer: CustomerInfo {
                email: Email::parse("buyer@example.com").unwrap(),
                first_name: "Ada".to_owned(),
                last_name: "Lovelace".to_owned(),
                phone_number: None,
            },
            items: vec![OrderItem {
                product_id: ProductId::new(10),
                variant_id: None,
                sku: "TRL-001".to_owned(),
                name: "Hand Trowel".to_owned(),
                quantity: 2,
                price_at_purchase: Decimal::from(12),
                discount: Decimal::ZERO,
                total: Decimal::from(24),
            }],
            pricing: OrderPricing {
                subtotal: Decimal::from(24),
                tax: Decimal::from(2),
                shipping: Decimal::from(5),
                discount: Decimal::ZERO,
                total: Decimal::from(31),
                currency: CurrencyCode::USD,
            },
            shipping_address: address(),
            billing_address: address(),
            payment: PaymentInfo {
                method: PaymentMethod::CreditCard,
                transaction_id: None,
                status: PaymentStatus::Pending,
                paid_at: None,
            },
            shipping: ShippingInfo::default(),
            notes: None,
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(seed_order().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_items() {
        let mut new = seed_order();
        new.items.clear();
        let err = new.validate().unwrap_err();
        assert!(err.errors().iter().any(|e| e.field == "items"));
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let mut new = seed_order();
        new.items[0].quantity = 0;
        let err = new.validate().unwrap_err();
        assert!(err.errors().iter().any(|e| e.field == "items[0].quantity"));
    }

    #[test]
    fn test_validate_rejects_negative_pricing() {
        let mut new = seed_order();
        new.pricing.tax = Decimal::from(-1);
        let err = new.validate().unwrap_err();
        assert!(err.errors().iter().any(|e| e.field == "pricing.tax"));
    }

    #[test]
    fn test_validate_rejects_blank_address_fields() {
        let mut new = seed_order();
        new.shipping_address.city = String::new();
        let err = new.validate().unwrap_err();
        assert!(
            err.errors()
                .iter()
                .any(|e| e.field == "shipping_address.city")
        );
    }

    #[test]
    fn test_status_change_serde() {
        let change = StatusChange {
            status: OrderStatus::Shipped,
            timestamp: Utc::now(),
            note: Some("left the warehouse".to_owned()),
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["status"], "shipped");
    }
}
