use std::sync::Arc;

use stockmaster_infra::{
    CatalogService, InMemoryLedgerStore, InMemoryOperationStore, InMemoryProductStore,
    InMemoryStockStore, InMemoryWarehouseStore, InventoryService,
};

/// The services handlers talk to.
///
/// Backed by the in-memory stores; the store seams are traits, so a
/// persistent backend swaps in here without touching the routes.
pub struct AppServices {
    pub inventory: InventoryService,
    pub catalog: CatalogService,
}

pub fn build_services() -> AppServices {
    let products = Arc::new(InMemoryProductStore::new());
    let warehouses = Arc::new(InMemoryWarehouseStore::new());
    let operations = Arc::new(InMemoryOperationStore::new());
    let stock = Arc::new(InMemoryStockStore::new());
    let ledger = Arc::new(InMemoryLedgerStore::new());

    let inventory = InventoryService::new(
        products.clone(),
        warehouses.clone(),
        operations,
        stock.clone(),
        ledger,
    );
    let catalog = CatalogService::new(products, warehouses, stock);

    AppServices { inventory, catalog }
}
