//! Orchard Catalog - Persistent data layer.
//!
//! This crate owns the five record kinds of the store (categories, products,
//! orders, users, reviews): their domain types, field validation, explicit
//! persistence lifecycle hooks, and `PostgreSQL` repositories.
//!
//! # Architecture
//!
//! - [`models`] - Domain structs with owned sub-document value types
//! - [`validate`] - Declarative per-field constraints ([`Validate`] trait)
//! - [`lifecycle`] - Named before-save hooks with explicit trigger conditions
//! - [`hierarchy`] - Category ancestor/level computation
//! - [`credential`] - Argon2id password hashing and verification
//! - [`db`] - Repositories over a shared `PgPool`, one per collection
//!
//! Repositories are plain values passed to whatever needs them; there is no
//! global model registry. Referenced entities are held as plain IDs and
//! dereferenced through explicit repository lookups.
//!
//! # Migrations
//!
//! Schema migrations live in `migrations/` and run via:
//! ```bash
//! cargo run -p orchard-cli -- migrate
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod credential;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod lifecycle;
pub mod models;
pub mod validate;

pub use config::{CatalogConfig, ConfigError};
pub use credential::CredentialError;
pub use db::RepositoryError;
pub use error::CatalogError;
pub use validate::{FieldError, Validate, ValidationErrors};
