use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockmaster_core::{Entity, LedgerEntryId, OperationId, ProductId, WarehouseId};

use crate::operation::OperationType;

/// Immutable audit record of one signed stock movement.
///
/// Entries reference products, warehouses and the producing operation by id
/// only; they outlive any later change to those entities. The store exposes
/// append and filtered reads, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub product: ProductId,
    /// Positive = stock increase, negative = decrease. Records the
    /// *requested* quantity even when the snapshot clamped.
    pub qty: i64,
    pub from_warehouse: Option<WarehouseId>,
    pub to_warehouse: Option<WarehouseId>,
    pub op_type: OperationType,
    /// Non-owning back-reference to the operation that produced this entry.
    pub reference: OperationId,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Whether the entry involves the given warehouse on either side.
    pub fn touches(&self, warehouse: WarehouseId) -> bool {
        self.from_warehouse == Some(warehouse) || self.to_warehouse == Some(warehouse)
    }
}

impl Entity for LedgerEntry {
    type Id = LedgerEntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A ledger entry minus the parts assigned at append time (id, operation
/// context, timestamp). Produced by the movement planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerDraft {
    pub product: ProductId,
    pub qty: i64,
    pub from_warehouse: Option<WarehouseId>,
    pub to_warehouse: Option<WarehouseId>,
}

impl LedgerDraft {
    pub fn into_entry(
        self,
        id: LedgerEntryId,
        op_type: OperationType,
        reference: OperationId,
        now: DateTime<Utc>,
    ) -> LedgerEntry {
        LedgerEntry {
            id,
            product: self.product,
            qty: self.qty,
            from_warehouse: self.from_warehouse,
            to_warehouse: self.to_warehouse,
            op_type,
            reference,
            recorded_at: now,
        }
    }
}

/// Filter for ledger reads. A warehouse filter matches either side of an
/// entry, mirroring how transfers carry both fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerFilter {
    pub product: Option<ProductId>,
    pub warehouse: Option<WarehouseId>,
    pub op_type: Option<OperationType>,
}

impl LedgerFilter {
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if let Some(product) = self.product {
            if entry.product != product {
                return false;
            }
        }
        if let Some(warehouse) = self.warehouse {
            if !entry.touches(warehouse) {
                return false;
            }
        }
        if let Some(op_type) = self.op_type {
            if entry.op_type != op_type {
                return false;
            }
        }
        true
    }
}
