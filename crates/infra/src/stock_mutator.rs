//! The single chokepoint for snapshot quantity changes.
//!
//! Every component that wants to change a stock quantity goes through
//! [`StockMutator::apply_delta`]; nothing else writes to the stock store.

use std::sync::Arc;

use stockmaster_core::{ProductId, WarehouseId};
use stockmaster_inventory::{stock, AppliedDelta, StockLevel};

use crate::locks::KeyedLocks;
use crate::service::ServiceError;
use crate::store::{ProductStore, StockStore};

pub struct StockMutator {
    products: Arc<dyn ProductStore>,
    stock: Arc<dyn StockStore>,
    locks: KeyedLocks<(ProductId, WarehouseId)>,
}

impl StockMutator {
    pub fn new(products: Arc<dyn ProductStore>, stock: Arc<dyn StockStore>) -> Self {
        Self {
            products,
            stock,
            locks: KeyedLocks::new(),
        }
    }

    /// Apply a signed delta to the (product, warehouse) snapshot row.
    ///
    /// - The read-modify-write is serialized per (product, warehouse).
    /// - A missing row for an existing product is the normal first-stock
    ///   case: the row is created at 0 before the delta is applied.
    /// - A result below zero is stored as 0 and reported via
    ///   `clamped_to_zero`; this is policy, not an error.
    /// - Fails with `NotFound` when the product id does not resolve.
    /// - The updated row is persisted before returning.
    pub fn apply_delta(
        &self,
        product: ProductId,
        warehouse: WarehouseId,
        delta: i64,
    ) -> Result<AppliedDelta, ServiceError> {
        let cell = self.locks.acquire((product, warehouse))?;
        let _guard = cell
            .lock()
            .map_err(|_| crate::store::StorageError::LockPoisoned("stock key".to_string()))?;

        if self.products.get(product)?.is_none() {
            return Err(ServiceError::NotFound);
        }

        let current = self
            .stock
            .get(product, warehouse)?
            .unwrap_or_else(|| StockLevel::empty(product, warehouse));

        let applied = stock::apply_delta(current.quantity, delta);
        if applied.clamped_to_zero {
            tracing::warn!(
                %product,
                %warehouse,
                current = current.quantity,
                delta,
                "stock movement clamped to zero"
            );
        }

        self.stock.upsert(StockLevel {
            product,
            warehouse,
            quantity: applied.new_quantity,
        })?;

        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stockmaster_catalog::Product;

    use crate::store::in_memory::{InMemoryProductStore, InMemoryStockStore};

    fn setup() -> (StockMutator, Arc<InMemoryStockStore>, ProductId) {
        let products = Arc::new(InMemoryProductStore::new());
        let stock = Arc::new(InMemoryStockStore::new());

        let product = Product::new(
            ProductId::new(),
            "Beans",
            "SKU-1",
            "coffee",
            "kg",
            0,
            Utc::now(),
        )
        .unwrap();
        let product_id = product.id;
        products.insert(product).unwrap();

        let mutator = StockMutator::new(products, stock.clone());
        (mutator, stock, product_id)
    }

    #[test]
    fn creates_row_lazily_on_first_delta() {
        let (mutator, stock, product) = setup();
        let wh = WarehouseId::new();

        let applied = mutator.apply_delta(product, wh, 50).unwrap();
        assert_eq!(applied.new_quantity, 50);
        assert!(!applied.clamped_to_zero);

        let row = stock.get(product, wh).unwrap().unwrap();
        assert_eq!(row.quantity, 50);
    }

    #[test]
    fn unknown_product_is_not_found() {
        let (mutator, _stock, _product) = setup();
        let err = mutator.apply_delta(ProductId::new(), WarehouseId::new(), 1);
        assert!(matches!(err, Err(ServiceError::NotFound)));
    }

    #[test]
    fn clamps_and_persists_zero() {
        let (mutator, stock, product) = setup();
        let wh = WarehouseId::new();

        mutator.apply_delta(product, wh, 100).unwrap();
        let applied = mutator.apply_delta(product, wh, -500).unwrap();

        assert!(applied.clamped_to_zero);
        assert_eq!(applied.new_quantity, 0);
        assert_eq!(stock.get(product, wh).unwrap().unwrap().quantity, 0);
    }

    #[test]
    fn zero_delta_still_creates_the_row() {
        let (mutator, stock, product) = setup();
        let wh = WarehouseId::new();

        let applied = mutator.apply_delta(product, wh, 0).unwrap();
        assert_eq!(applied.new_quantity, 0);
        assert!(!applied.clamped_to_zero);
        assert!(stock.get(product, wh).unwrap().is_some());
    }

    #[test]
    fn concurrent_deltas_do_not_lose_updates() {
        let (mutator, stock, product) = setup();
        let mutator = Arc::new(mutator);
        let wh = WarehouseId::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let mutator = mutator.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        mutator.apply_delta(product, wh, 1).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stock.get(product, wh).unwrap().unwrap().quantity, 4000);
    }
}
