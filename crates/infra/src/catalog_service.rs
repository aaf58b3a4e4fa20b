//! Product and warehouse registry management.
//!
//! Reference data the inventory core resolves by id. Uniqueness of SKUs
//! and warehouse codes is enforced here, against the stores.

use std::sync::Arc;

use chrono::Utc;

use stockmaster_catalog::{Product, ProductPatch, Warehouse};
use stockmaster_core::{ProductId, UserId, WarehouseId};

use crate::service::ServiceError;
use crate::store::{ProductStore, StockStore, WarehouseStore};

pub struct CatalogService {
    products: Arc<dyn ProductStore>,
    warehouses: Arc<dyn WarehouseStore>,
    stock: Arc<dyn StockStore>,
}

impl CatalogService {
    pub fn new(
        products: Arc<dyn ProductStore>,
        warehouses: Arc<dyn WarehouseStore>,
        stock: Arc<dyn StockStore>,
    ) -> Self {
        Self {
            products,
            warehouses,
            stock,
        }
    }

    pub fn create_product(
        &self,
        name: String,
        sku: String,
        category: String,
        unit: String,
        reorder_level: i64,
    ) -> Result<Product, ServiceError> {
        if self.products.find_by_sku(&sku)?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "product with sku '{sku}' already exists"
            )));
        }

        let product = Product::new(
            ProductId::new(),
            name,
            sku,
            category,
            unit,
            reorder_level,
            Utc::now(),
        )?;
        self.products.insert(product.clone())?;

        tracing::info!(product = %product.id, sku = %product.sku, "product created");
        Ok(product)
    }

    pub fn product(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.products.get(id)?.ok_or(ServiceError::NotFound)
    }

    /// List products, optionally narrowed to a category and/or to products
    /// that have a snapshot row in the given warehouse.
    pub fn list_products(
        &self,
        category: Option<&str>,
        stocked_in: Option<WarehouseId>,
    ) -> Result<Vec<Product>, ServiceError> {
        let mut products = self.products.list()?;

        if let Some(category) = category {
            products.retain(|p| p.category == category);
        }

        if let Some(warehouse) = stocked_in {
            let stocked: Vec<ProductId> = self
                .stock
                .for_warehouse(warehouse)?
                .into_iter()
                .map(|l| l.product)
                .collect();
            products.retain(|p| stocked.contains(&p.id));
        }

        Ok(products)
    }

    pub fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, ServiceError> {
        let mut product = self.products.get(id)?.ok_or(ServiceError::NotFound)?;
        product.apply_patch(patch, Utc::now())?;
        self.products.update(product.clone())?;
        Ok(product)
    }

    pub fn create_warehouse(
        &self,
        name: String,
        code: String,
        location: String,
        created_by: UserId,
    ) -> Result<Warehouse, ServiceError> {
        if self.warehouses.find_by_code(&code)?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "warehouse with code '{code}' already exists"
            )));
        }

        let warehouse = Warehouse::new(
            WarehouseId::new(),
            name,
            code,
            location,
            created_by,
            Utc::now(),
        )?;
        self.warehouses.insert(warehouse.clone())?;

        tracing::info!(warehouse = %warehouse.id, code = %warehouse.code, "warehouse created");
        Ok(warehouse)
    }

    pub fn warehouse(&self, id: WarehouseId) -> Result<Warehouse, ServiceError> {
        self.warehouses.get(id)?.ok_or(ServiceError::NotFound)
    }

    pub fn list_warehouses(&self) -> Result<Vec<Warehouse>, ServiceError> {
        Ok(self.warehouses.list()?)
    }
}
