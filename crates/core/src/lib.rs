//! Orchard Core - Shared types library.
//!
//! This crate provides common types used across all Orchard components:
//! - `catalog` - Persistent data layer (categories, products, orders, users, reviews)
//! - `cart` - Client-side shopping cart state holder
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, slugs,
//!   phone numbers, order numbers, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
