use serde::{Deserialize, Serialize};

use stockmaster_core::{ProductId, WarehouseId};

/// Current on-hand quantity for a (product, warehouse) pair.
///
/// This is the snapshot: an incrementally maintained cache of the ledger
/// history. It is created lazily at 0, never deleted, and only the stock
/// mutator writes to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub product: ProductId,
    pub warehouse: WarehouseId,
    pub quantity: i64,
}

impl StockLevel {
    pub fn empty(product: ProductId, warehouse: WarehouseId) -> Self {
        Self {
            product,
            warehouse,
            quantity: 0,
        }
    }
}

/// Outcome of applying a signed delta to a quantity.
///
/// Clamping is a policy outcome, not an error: a delivery of more than is
/// on hand floors the snapshot at 0 while the ledger keeps the requested
/// quantity. The flag keeps that observable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDelta {
    pub new_quantity: i64,
    pub clamped_to_zero: bool,
}

/// Pure clamp arithmetic: add `delta` to `current`, flooring at zero.
pub fn apply_delta(current: i64, delta: i64) -> AppliedDelta {
    let raw = current + delta;
    if raw < 0 {
        AppliedDelta {
            new_quantity: 0,
            clamped_to_zero: true,
        }
    } else {
        AppliedDelta {
            new_quantity: raw,
            clamped_to_zero: false,
        }
    }
}
