//! Persistence boundary: one small trait per store, plus the in-memory
//! reference implementations.
//!
//! The traits are deliberately dumb: uniqueness and existence rules live
//! in the services, serialization of access lives in the mutator/validator
//! locks. A SQL backend slots in behind the same seams.

pub mod in_memory;

use thiserror::Error;

use stockmaster_catalog::{Product, Warehouse};
use stockmaster_core::{OperationId, ProductId, WarehouseId};
use stockmaster_inventory::{
    LedgerEntry, LedgerFilter, Operation, OperationStatus, OperationType, StockLevel,
};

/// Underlying persistence failure. Never retried internally; surfaced to
/// the caller as an internal error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub trait ProductStore: Send + Sync {
    fn insert(&self, product: Product) -> Result<(), StorageError>;
    fn update(&self, product: Product) -> Result<(), StorageError>;
    fn get(&self, id: ProductId) -> Result<Option<Product>, StorageError>;
    fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, StorageError>;
    fn list(&self) -> Result<Vec<Product>, StorageError>;
}

pub trait WarehouseStore: Send + Sync {
    fn insert(&self, warehouse: Warehouse) -> Result<(), StorageError>;
    fn get(&self, id: WarehouseId) -> Result<Option<Warehouse>, StorageError>;
    fn find_by_code(&self, code: &str) -> Result<Option<Warehouse>, StorageError>;
    fn list(&self) -> Result<Vec<Warehouse>, StorageError>;
}

/// Filter for operation listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationFilter {
    pub op_type: Option<OperationType>,
    pub status: Option<OperationStatus>,
}

impl OperationFilter {
    pub fn matches(&self, op: &Operation) -> bool {
        self.op_type.map_or(true, |t| op.op_type == t)
            && self.status.map_or(true, |s| op.status == s)
    }
}

pub trait OperationStore: Send + Sync {
    fn insert(&self, op: Operation) -> Result<(), StorageError>;
    fn update(&self, op: Operation) -> Result<(), StorageError>;
    fn get(&self, id: OperationId) -> Result<Option<Operation>, StorageError>;
    /// Newest first.
    fn list(&self, filter: &OperationFilter) -> Result<Vec<Operation>, StorageError>;
}

pub trait StockStore: Send + Sync {
    fn get(&self, product: ProductId, warehouse: WarehouseId)
        -> Result<Option<StockLevel>, StorageError>;
    fn upsert(&self, level: StockLevel) -> Result<(), StorageError>;
    fn for_product(&self, product: ProductId) -> Result<Vec<StockLevel>, StorageError>;
    fn for_warehouse(&self, warehouse: WarehouseId) -> Result<Vec<StockLevel>, StorageError>;
}

pub trait LedgerStore: Send + Sync {
    /// Pure insert; there is no update or delete in this contract.
    fn append(&self, entry: LedgerEntry) -> Result<LedgerEntry, StorageError>;
    /// Filtered read, most recent first.
    fn query(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>, StorageError>;
}
