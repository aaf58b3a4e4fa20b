//! Infrastructure layer: stores, locking, and the operation services.
//!
//! The domain crates stay pure; everything that touches shared mutable
//! state goes through here. The snapshot chokepoint is
//! [`stock_mutator::StockMutator`]; the operation-to-ledger engine is
//! [`service::InventoryService`].

pub mod catalog_service;
pub mod locks;
pub mod service;
pub mod stock_mutator;
pub mod store;


pub use catalog_service::CatalogService;
pub use service::{AppliedMovement, InventoryService, ServiceError, ValidatedOperation};
pub use stock_mutator::StockMutator;
pub use store::{
    in_memory::{
        InMemoryLedgerStore, InMemoryOperationStore, InMemoryProductStore, InMemoryStockStore,
        InMemoryWarehouseStore,
    },
    LedgerStore, OperationFilter, OperationStore, ProductStore, StockStore, StorageError,
    WarehouseStore,
};
