//! The cart itself: an ordered line collection with snapshot mirroring.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use orchard_core::{ListPrice, ProductId};

use crate::snapshot::SnapshotStore;

/// The presentation fields of a product, frozen onto a cart line at add
/// time. Later catalog edits do not reach lines already in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Product reference.
    pub id: ProductId,
    /// Display name at add time.
    pub name: String,
    /// List price at add time.
    pub price: ListPrice,
    /// Primary image URL at add time.
    pub image: Option<String>,
}

/// One product-and-quantity entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product reference.
    pub product_id: ProductId,
    /// Display name frozen at add time.
    pub name: String,
    /// Price frozen at add time.
    pub price: ListPrice,
    /// Primary image URL frozen at add time.
    pub image: Option<String>,
    /// Units in the cart; always at least 1.
    pub quantity: i32,
}

impl CartLine {
    /// The price charged per unit: sale if present and non-zero, else
    /// regular.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.price.effective()
    }
}

/// In-memory cart mirrored to a [`SnapshotStore`].
///
/// Every mutation rewrites the full snapshot under a single key. The write
/// is best-effort: failures are logged, never surfaced, so the mutation
/// call contract stays infallible. There is no transactionality between
/// the in-memory state and the snapshot.
#[derive(Debug)]
pub struct CartStore<S> {
    lines: Vec<CartLine>,
    snapshots: S,
    key: String,
}

impl<S: SnapshotStore> CartStore<S> {
    /// Snapshot key used by [`CartStore::open`].
    pub const DEFAULT_KEY: &'static str = "cart";

    /// Open a cart backed by `snapshots`, hydrating from the default key.
    pub fn open(snapshots: S) -> Self {
        Self::open_at(snapshots, Self::DEFAULT_KEY)
    }

    /// Open a cart hydrating from a specific snapshot key.
    ///
    /// A missing snapshot starts an empty cart. A snapshot that exists but
    /// does not parse is treated the same way, with a logged warning — a
    /// corrupt snapshot must not brick the cart.
    pub fn open_at(snapshots: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let lines = match snapshots.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!(key, error = %e, "cart snapshot is corrupt; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "cart snapshot unreadable; starting empty");
                Vec::new()
            }
        };

        Self {
            lines,
            snapshots,
            key,
        }
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line for the same product is merged: its quantity grows
    /// by `quantity` and the line keeps its original position (and its
    /// originally frozen presentation fields). Otherwise a new line is
    /// appended at the end.
    pub fn add(&mut self, product: &ProductSummary, quantity: i32) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product.id)
        {
            line.quantity += quantity;
        } else {
            self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                image: product.image.clone(),
                quantity,
            });
        }
        self.persist();
    }

    /// Add one unit of a product.
    pub fn add_one(&mut self, product: &ProductSummary) {
        self.add(product, 1);
    }

    /// Remove a product's line entirely; absent products are a no-op.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id != product_id);
        self.persist();
    }

    /// Set a line's quantity to exactly `quantity` (not additive).
    ///
    /// A quantity of zero or less removes the line. An unknown product is a
    /// no-op.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i32) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            line.quantity = quantity;
        }
        self.persist();
    }

    /// Empty the cart and erase the persisted snapshot key itself.
    pub fn clear(&mut self) {
        self.lines.clear();
        if let Err(e) = self.snapshots.remove(&self.key) {
            warn!(key = %self.key, error = %e, "failed to remove cart snapshot");
        }
    }

    /// The lines currently in the cart, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }

    /// Sum over lines of `quantity x unit price`.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| line.unit_price() * Decimal::from(line.quantity))
            .sum()
    }

    /// Mirror the current lines to the snapshot store. Best-effort.
    fn persist(&mut self) {
        let raw = match serde_json::to_string(&self.lines) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to serialize cart snapshot");
                return;
            }
        };

        if let Err(e) = self.snapshots.set(&self.key, &raw) {
            warn!(key = %self.key, error = %e, "failed to write cart snapshot");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use orchard_core::CurrencyCode;

    use crate::snapshot::{MemorySnapshotStore, SnapshotStore as _};

    fn product(id: i64, regular: i64, sale: Option<i64>) -> ProductSummary {
        let price = match sale {
            Some(sale) => ListPrice::on_sale(
                Decimal::from(regular),
                Decimal::from(sale),
                CurrencyCode::USD,
            ),
            None => ListPrice::regular(Decimal::from(regular), CurrencyCode::USD),
        };
        ProductSummary {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price,
            image: None,
        }
    }

    #[test]
    fn test_repeat_add_merges_quantities() {
        let mut cart = CartStore::open(MemorySnapshotStore::new());
        cart.add(&product(1, 10, None), 2);
        cart.add(&product(1, 10, None), 3);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_merge_preserves_line_position_and_snapshot_fields() {
        let mut cart = CartStore::open(MemorySnapshotStore::new());
        cart.add(&product(1, 10, None), 1);
        cart.add(&product(2, 20, None), 1);

        // Re-adding product 1 with different presentation fields merges into
        // the original line: position and frozen fields are kept.
        let mut renamed = product(1, 99, None);
        renamed.name = "Renamed".to_owned();
        cart.add(&renamed, 1);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].product_id, ProductId::new(1));
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.lines()[0].name, "Product 1");
        assert_eq!(cart.lines()[0].price.regular, Decimal::from(10));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = CartStore::open(MemorySnapshotStore::new());
        cart.add(&product(1, 10, None), 1);
        cart.remove(ProductId::new(404));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_update_quantity_sets_exactly() {
        let mut cart = CartStore::open(MemorySnapshotStore::new());
        cart.add(&product(1, 10, None), 2);
        cart.update_quantity(ProductId::new(1), 7);
        assert_eq!(cart.lines()[0].quantity, 7);
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut cart = CartStore::open(MemorySnapshotStore::new());
        cart.add(&product(1, 10, None), 2);
        cart.update_quantity(ProductId::new(1), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_missing_is_noop() {
        let mut cart = CartStore::open(MemorySnapshotStore::new());
        cart.add(&product(1, 10, None), 2);
        cart.update_quantity(ProductId::new(404), 5);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_total_price_prefers_nonzero_sale() {
        let mut cart = CartStore::open(MemorySnapshotStore::new());
        cart.add(&product(1, 10, Some(8)), 2);
        cart.add(&product(2, 5, None), 1);

        // 2*8 + 1*5
        assert_eq!(cart.total_price(), Decimal::from(21));
    }

    #[test]
    fn test_total_price_ignores_zero_sale() {
        let mut cart = CartStore::open(MemorySnapshotStore::new());
        cart.add(&product(1, 10, Some(0)), 3);
        assert_eq!(cart.total_price(), Decimal::from(30));
    }

    #[test]
    fn test_every_mutation_rewrites_snapshot() {
        let storage = MemorySnapshotStore::new();
        let mut cart = CartStore::open(storage.clone());

        cart.add(&product(1, 10, None), 1);
        let after_add = storage.get(CartStore::<MemorySnapshotStore>::DEFAULT_KEY).unwrap();
        assert!(after_add.is_some());

        cart.update_quantity(ProductId::new(1), 4);
        let after_update = storage.get(CartStore::<MemorySnapshotStore>::DEFAULT_KEY).unwrap();
        assert!(after_update.unwrap().contains("\"quantity\":4"));
    }

    #[test]
    fn test_clear_empties_cart_and_deletes_key() {
        let storage = MemorySnapshotStore::new();
        let mut cart = CartStore::open(storage.clone());
        cart.add(&product(1, 10, None), 2);
        cart.clear();

        assert_eq!(cart.total_items(), 0);
        // The key itself is gone, not just left as an empty array.
        assert_eq!(
            storage
                .get(CartStore::<MemorySnapshotStore>::DEFAULT_KEY)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_hydration_restores_lines_in_order() {
        let storage = MemorySnapshotStore::new();
        {
            let mut cart = CartStore::open(storage.clone());
            cart.add(&product(2, 20, None), 1);
            cart.add(&product(1, 10, Some(8)), 2);
        }

        let restored = CartStore::open(storage);
        assert_eq!(restored.lines().len(), 2);
        assert_eq!(restored.lines()[0].product_id, ProductId::new(2));
        assert_eq!(restored.lines()[1].product_id, ProductId::new(1));
        assert_eq!(restored.total_price(), Decimal::from(36));
    }

    #[test]
    fn test_corrupt_snapshot_hydrates_empty() {
        let mut storage = MemorySnapshotStore::new();
        storage
            .set(CartStore::<MemorySnapshotStore>::DEFAULT_KEY, "{not json")
            .unwrap();

        let cart = CartStore::open(storage);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_custom_key() {
        let storage = MemorySnapshotStore::new();
        let mut cart = CartStore::open_at(storage.clone(), "guest-cart");
        cart.add(&product(1, 10, None), 1);

        assert!(storage.get("guest-cart").unwrap().is_some());
        assert!(
            storage
                .get(CartStore::<MemorySnapshotStore>::DEFAULT_KEY)
                .unwrap()
                .is_none()
        );
    }
}
