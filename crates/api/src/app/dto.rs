//! Request/response DTOs and JSON mapping helpers.

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use stockmaster_catalog::{Product, ProductPatch, Warehouse};
use stockmaster_core::{ProductId, WarehouseId};
use stockmaster_infra::ValidatedOperation;
use stockmaster_inventory::{LedgerEntry, Operation, StockLevel};

// ── requests ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LineRequest {
    pub product: ProductId,
    pub qty: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateReceiptRequest {
    pub to_warehouse: WarehouseId,
    pub lines: Vec<LineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDeliveryRequest {
    pub from_warehouse: WarehouseId,
    pub lines: Vec<LineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransferRequest {
    pub from_warehouse: WarehouseId,
    pub to_warehouse: WarehouseId,
    pub lines: Vec<LineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdjustmentRequest {
    pub product: ProductId,
    pub warehouse: WarehouseId,
    /// The counted quantity; the signed delta is computed at creation.
    pub new_qty: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub unit: String,
    #[serde(default)]
    pub reorder_level: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub reorder_level: Option<i64>,
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(value: UpdateProductRequest) -> Self {
        ProductPatch {
            name: value.name,
            category: value.category,
            unit: value.unit,
            reorder_level: value.reorder_level,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateWarehouseRequest {
    pub name: String,
    pub code: String,
    pub location: String,
}

pub fn to_lines(lines: Vec<LineRequest>) -> Vec<(ProductId, i64)> {
    lines.into_iter().map(|l| (l.product, l.qty)).collect()
}

// ── responses ──────────────────────────────────────────────────────────

pub fn operation_to_json(op: &Operation) -> JsonValue {
    json!({
        "id": op.id.to_string(),
        "type": op.op_type,
        "status": op.status,
        "lines": op.lines.iter().map(|l| json!({
            "product": l.product.to_string(),
            "qty": l.qty,
            "from_warehouse": l.from_warehouse.map(|w| w.to_string()),
            "to_warehouse": l.to_warehouse.map(|w| w.to_string()),
        })).collect::<Vec<_>>(),
        "created_by": op.created_by.to_string(),
        "validated_by": op.validated_by.map(|u| u.to_string()),
        "created_at": op.created_at,
        "updated_at": op.updated_at,
    })
}

pub fn validated_operation_to_json(v: &ValidatedOperation) -> JsonValue {
    json!({
        "operation": operation_to_json(&v.operation),
        "movements": v.movements.iter().map(|m| json!({
            "product": m.product.to_string(),
            "warehouse": m.warehouse.to_string(),
            "delta": m.delta,
            "new_quantity": m.new_quantity,
            "clamped_to_zero": m.clamped_to_zero,
        })).collect::<Vec<_>>(),
    })
}

pub fn ledger_entry_to_json(entry: &LedgerEntry) -> JsonValue {
    json!({
        "id": entry.id.to_string(),
        "product": entry.product.to_string(),
        "qty": entry.qty,
        "from_warehouse": entry.from_warehouse.map(|w| w.to_string()),
        "to_warehouse": entry.to_warehouse.map(|w| w.to_string()),
        "type": entry.op_type,
        "reference": entry.reference.to_string(),
        "recorded_at": entry.recorded_at,
    })
}

pub fn stock_level_to_json(level: &StockLevel) -> JsonValue {
    json!({
        "product": level.product.to_string(),
        "warehouse": level.warehouse.to_string(),
        "quantity": level.quantity,
    })
}

pub fn product_to_json(product: &Product) -> JsonValue {
    json!({
        "id": product.id.to_string(),
        "name": product.name,
        "sku": product.sku,
        "category": product.category,
        "unit": product.unit,
        "reorder_level": product.reorder_level,
        "created_at": product.created_at,
        "updated_at": product.updated_at,
    })
}

pub fn warehouse_to_json(warehouse: &Warehouse) -> JsonValue {
    json!({
        "id": warehouse.id.to_string(),
        "name": warehouse.name,
        "code": warehouse.code,
        "location": warehouse.location,
        "created_by": warehouse.created_by.to_string(),
        "created_at": warehouse.created_at,
    })
}
