//! Domain types for the five record kinds.
//!
//! Sub-documents (images, variants, addresses, order items, status history,
//! helpful votes) are owned value types embedded by composition; they have no
//! independent identity or lifecycle. References to other entities are plain
//! typed IDs resolved through explicit repository lookups.

pub mod category;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use category::{Category, CategoryMetadata, NewCategory, UpdateCategory};
pub use order::{
    CustomerInfo, NewOrder, Order, OrderItem, OrderPricing, PaymentInfo, PostalAddress,
    ShippingInfo, StatusChange,
};
pub use product::{
    Inventory, NewProduct, Product, ProductImage, ProductVariant, RatingSummary,
};
pub use review::{HelpfulVotes, NewReview, Review, ReviewResponse};
pub use user::{NewUser, User, UserAddress, UserProfile};
