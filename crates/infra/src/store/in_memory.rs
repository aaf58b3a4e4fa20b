//! In-memory store implementations.
//!
//! Intended for tests/dev and single-node deployments. Not optimized for
//! performance; every store is a `RwLock` over a plain map (the ledger is a
//! `Vec`, append-only by construction).

use std::collections::HashMap;
use std::sync::RwLock;

use stockmaster_catalog::{Product, Warehouse};
use stockmaster_core::{OperationId, ProductId, WarehouseId};
use stockmaster_inventory::{LedgerEntry, LedgerFilter, Operation, StockLevel};

use super::{
    LedgerStore, OperationFilter, OperationStore, ProductStore, StockStore, StorageError,
    WarehouseStore,
};

fn poisoned(what: &str) -> StorageError {
    StorageError::LockPoisoned(what.to_string())
}

#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    rows: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductStore for InMemoryProductStore {
    fn insert(&self, product: Product) -> Result<(), StorageError> {
        let mut rows = self.rows.write().map_err(|_| poisoned("products"))?;
        rows.insert(product.id, product);
        Ok(())
    }

    fn update(&self, product: Product) -> Result<(), StorageError> {
        self.insert(product)
    }

    fn get(&self, id: ProductId) -> Result<Option<Product>, StorageError> {
        let rows = self.rows.read().map_err(|_| poisoned("products"))?;
        Ok(rows.get(&id).cloned())
    }

    fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, StorageError> {
        let rows = self.rows.read().map_err(|_| poisoned("products"))?;
        Ok(rows.values().find(|p| p.sku == sku).cloned())
    }

    fn list(&self) -> Result<Vec<Product>, StorageError> {
        let rows = self.rows.read().map_err(|_| poisoned("products"))?;
        let mut out: Vec<_> = rows.values().cloned().collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(out)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryWarehouseStore {
    rows: RwLock<HashMap<WarehouseId, Warehouse>>,
}

impl InMemoryWarehouseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WarehouseStore for InMemoryWarehouseStore {
    fn insert(&self, warehouse: Warehouse) -> Result<(), StorageError> {
        let mut rows = self.rows.write().map_err(|_| poisoned("warehouses"))?;
        rows.insert(warehouse.id, warehouse);
        Ok(())
    }

    fn get(&self, id: WarehouseId) -> Result<Option<Warehouse>, StorageError> {
        let rows = self.rows.read().map_err(|_| poisoned("warehouses"))?;
        Ok(rows.get(&id).cloned())
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Warehouse>, StorageError> {
        let rows = self.rows.read().map_err(|_| poisoned("warehouses"))?;
        Ok(rows.values().find(|w| w.code == code).cloned())
    }

    fn list(&self) -> Result<Vec<Warehouse>, StorageError> {
        let rows = self.rows.read().map_err(|_| poisoned("warehouses"))?;
        let mut out: Vec<_> = rows.values().cloned().collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(out)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryOperationStore {
    rows: RwLock<HashMap<OperationId, Operation>>,
}

impl InMemoryOperationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OperationStore for InMemoryOperationStore {
    fn insert(&self, op: Operation) -> Result<(), StorageError> {
        let mut rows = self.rows.write().map_err(|_| poisoned("operations"))?;
        rows.insert(op.id, op);
        Ok(())
    }

    fn update(&self, op: Operation) -> Result<(), StorageError> {
        self.insert(op)
    }

    fn get(&self, id: OperationId) -> Result<Option<Operation>, StorageError> {
        let rows = self.rows.read().map_err(|_| poisoned("operations"))?;
        Ok(rows.get(&id).cloned())
    }

    fn list(&self, filter: &OperationFilter) -> Result<Vec<Operation>, StorageError> {
        let rows = self.rows.read().map_err(|_| poisoned("operations"))?;
        let mut out: Vec<_> = rows.values().filter(|op| filter.matches(op)).cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    rows: RwLock<HashMap<(ProductId, WarehouseId), StockLevel>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StockStore for InMemoryStockStore {
    fn get(
        &self,
        product: ProductId,
        warehouse: WarehouseId,
    ) -> Result<Option<StockLevel>, StorageError> {
        let rows = self.rows.read().map_err(|_| poisoned("stock"))?;
        Ok(rows.get(&(product, warehouse)).copied())
    }

    fn upsert(&self, level: StockLevel) -> Result<(), StorageError> {
        let mut rows = self.rows.write().map_err(|_| poisoned("stock"))?;
        rows.insert((level.product, level.warehouse), level);
        Ok(())
    }

    fn for_product(&self, product: ProductId) -> Result<Vec<StockLevel>, StorageError> {
        let rows = self.rows.read().map_err(|_| poisoned("stock"))?;
        let mut out: Vec<_> = rows
            .values()
            .filter(|l| l.product == product)
            .copied()
            .collect();
        out.sort_by_key(|l| *l.warehouse.as_uuid());
        Ok(out)
    }

    fn for_warehouse(&self, warehouse: WarehouseId) -> Result<Vec<StockLevel>, StorageError> {
        let rows = self.rows.read().map_err(|_| poisoned("stock"))?;
        let mut out: Vec<_> = rows
            .values()
            .filter(|l| l.warehouse == warehouse)
            .copied()
            .collect();
        out.sort_by_key(|l| *l.product.as_uuid());
        Ok(out)
    }
}

/// Append-only ledger. Insertion order is the audit order; reads come back
/// newest first.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    entries: RwLock<Vec<LedgerEntry>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn append(&self, entry: LedgerEntry) -> Result<LedgerEntry, StorageError> {
        let mut entries = self.entries.write().map_err(|_| poisoned("ledger"))?;
        entries.push(entry.clone());
        Ok(entry)
    }

    fn query(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>, StorageError> {
        let entries = self.entries.read().map_err(|_| poisoned("ledger"))?;
        Ok(entries
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }
}
