use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockmaster_core::{DomainError, DomainResult, Entity, ProductId};

/// A product tracked by the inventory system.
///
/// Stock quantities do not live here; they belong to the snapshot store,
/// keyed by (product, warehouse).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unique stock-keeping unit. Uniqueness is enforced by the store.
    pub sku: String,
    pub category: String,
    /// Unit of measure (e.g. "kg", "pcs", "boxes").
    pub unit: String,
    /// Quantity below which the product is considered low-stock.
    pub reorder_level: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable subset of product fields. SKU is immutable after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub reorder_level: Option<i64>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        sku: impl Into<String>,
        category: impl Into<String>,
        unit: impl Into<String>,
        reorder_level: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let sku = sku.into();
        let category = category.into();
        let unit = unit.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if sku.trim().is_empty() {
            return Err(DomainError::validation("product sku cannot be empty"));
        }
        if category.trim().is_empty() {
            return Err(DomainError::validation("product category cannot be empty"));
        }
        if unit.trim().is_empty() {
            return Err(DomainError::validation("product unit cannot be empty"));
        }
        if reorder_level < 0 {
            return Err(DomainError::validation("reorder level cannot be negative"));
        }

        Ok(Self {
            id,
            name,
            sku,
            category,
            unit,
            reorder_level,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a patch to the mutable fields.
    pub fn apply_patch(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("product name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(category) = patch.category {
            if category.trim().is_empty() {
                return Err(DomainError::validation("product category cannot be empty"));
            }
            self.category = category;
        }
        if let Some(unit) = patch.unit {
            if unit.trim().is_empty() {
                return Err(DomainError::validation("product unit cannot be empty"));
            }
            self.unit = unit;
        }
        if let Some(reorder_level) = patch.reorder_level {
            if reorder_level < 0 {
                return Err(DomainError::validation("reorder level cannot be negative"));
            }
            self.reorder_level = reorder_level;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
