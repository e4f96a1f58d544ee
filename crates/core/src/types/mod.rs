//! Core types for Orchard.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order_number;
pub mod phone;
pub mod price;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use order_number::{OrderNumber, OrderNumberError};
pub use phone::{PhoneNumber, PhoneNumberError};
pub use price::{CurrencyCode, ListPrice};
pub use slug::{Slug, SlugError};
pub use status::*;
