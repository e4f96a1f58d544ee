//! Orchard Cart - Client-side shopping cart state holder.
//!
//! The cart is an in-memory, ordered collection of line items mirrored to a
//! persistent string-keyed snapshot after every mutation and hydrated from
//! it at startup. The snapshot seam ([`SnapshotStore`]) stands in for
//! whatever key-value storage the client runtime provides; this crate ships
//! a shared in-memory implementation and a file-backed one.
//!
//! Persistence is fire-and-forget: cart operations never fail observably to
//! the caller. Snapshot write failures are logged and swallowed, and a
//! corrupt snapshot hydrates as an empty cart.
//!
//! ```
//! use orchard_cart::{CartStore, MemorySnapshotStore, ProductSummary};
//! use orchard_core::{CurrencyCode, ListPrice, ProductId};
//! use rust_decimal::Decimal;
//!
//! let trowel = ProductSummary {
//!     id: ProductId::new(1),
//!     name: "Hand Trowel".to_owned(),
//!     price: ListPrice::regular(Decimal::from(12), CurrencyCode::USD),
//!     image: None,
//! };
//!
//! let mut cart = CartStore::open(MemorySnapshotStore::default());
//! cart.add(&trowel, 2);
//! cart.add(&trowel, 3);
//! assert_eq!(cart.total_items(), 5);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod snapshot;
pub mod store;

pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotError, SnapshotStore};
pub use store::{CartLine, CartStore, ProductSummary};
