//! The operation-to-ledger engine.
//!
//! `InventoryService` is the application-level orchestration between the
//! pure domain (operation constructors, the movement planner) and the
//! stores. Creation records a pending operation and touches no stock;
//! validation applies the plan through the stock mutator and the ledger as
//! one unit and flips the status exactly once.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use stockmaster_core::{DomainError, LedgerEntryId, OperationId, ProductId, UserId, WarehouseId};
use stockmaster_inventory::{
    plan, AppliedDelta, LedgerEntry, LedgerFilter, Operation, OperationStatus, StockLevel,
};

use crate::locks::KeyedLocks;
use crate::stock_mutator::StockMutator;
use crate::store::{
    LedgerStore, OperationFilter, OperationStore, ProductStore, StockStore, StorageError,
    WarehouseStore,
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed request (missing line fields, wrong warehouse shape, ...).
    /// No state change occurred.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Operation, product or warehouse id did not resolve. No partial state
    /// change occurred.
    #[error("not found")]
    NotFound,

    /// Re-validation attempt on a `done` operation.
    #[error("operation already validated")]
    AlreadyValidated,

    /// Conflict (duplicate SKU/code, canceled operation, ...).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authorization failure surfaced from the domain.
    #[error("unauthorized")]
    Unauthorized,

    /// Underlying persistence failure; caller retries at its discretion.
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvariantViolation(msg) => ServiceError::InvariantViolation(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::NotFound => ServiceError::NotFound,
            DomainError::AlreadyValidated => ServiceError::AlreadyValidated,
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
            DomainError::Unauthorized => ServiceError::Unauthorized,
        }
    }
}

/// One applied line effect, reported back to the caller so clamping stays
/// observable.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMovement {
    pub product: ProductId,
    pub warehouse: WarehouseId,
    pub delta: i64,
    pub new_quantity: i64,
    pub clamped_to_zero: bool,
}

/// Result of a successful validation.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedOperation {
    pub operation: Operation,
    pub movements: Vec<AppliedMovement>,
}

pub struct InventoryService {
    products: Arc<dyn ProductStore>,
    warehouses: Arc<dyn WarehouseStore>,
    operations: Arc<dyn OperationStore>,
    ledger: Arc<dyn LedgerStore>,
    stock: Arc<dyn StockStore>,
    mutator: StockMutator,
    op_locks: KeyedLocks<OperationId>,
}

impl InventoryService {
    pub fn new(
        products: Arc<dyn ProductStore>,
        warehouses: Arc<dyn WarehouseStore>,
        operations: Arc<dyn OperationStore>,
        stock: Arc<dyn StockStore>,
        ledger: Arc<dyn LedgerStore>,
    ) -> Self {
        let mutator = StockMutator::new(products.clone(), stock.clone());
        Self {
            products,
            warehouses,
            operations,
            ledger,
            stock,
            mutator,
            op_locks: KeyedLocks::new(),
        }
    }

    // ── creation ───────────────────────────────────────────────────────

    pub fn create_receipt(
        &self,
        to_warehouse: WarehouseId,
        lines: Vec<(ProductId, i64)>,
        created_by: UserId,
    ) -> Result<Operation, ServiceError> {
        self.ensure_warehouse(to_warehouse)?;
        self.ensure_products(lines.iter().map(|(p, _)| *p))?;
        let op = Operation::receipt(OperationId::new(), to_warehouse, lines, created_by, Utc::now())?;
        self.insert_pending(op)
    }

    pub fn create_delivery(
        &self,
        from_warehouse: WarehouseId,
        lines: Vec<(ProductId, i64)>,
        created_by: UserId,
    ) -> Result<Operation, ServiceError> {
        self.ensure_warehouse(from_warehouse)?;
        self.ensure_products(lines.iter().map(|(p, _)| *p))?;
        let op =
            Operation::delivery(OperationId::new(), from_warehouse, lines, created_by, Utc::now())?;
        self.insert_pending(op)
    }

    pub fn create_transfer(
        &self,
        from_warehouse: WarehouseId,
        to_warehouse: WarehouseId,
        lines: Vec<(ProductId, i64)>,
        created_by: UserId,
    ) -> Result<Operation, ServiceError> {
        self.ensure_warehouse(from_warehouse)?;
        self.ensure_warehouse(to_warehouse)?;
        self.ensure_products(lines.iter().map(|(p, _)| *p))?;
        let op = Operation::transfer(
            OperationId::new(),
            from_warehouse,
            to_warehouse,
            lines,
            created_by,
            Utc::now(),
        )?;
        self.insert_pending(op)
    }

    /// The adjustment delta is fixed here, at creation time, from the
    /// current snapshot quantity and the counted quantity.
    pub fn create_adjustment(
        &self,
        product: ProductId,
        warehouse: WarehouseId,
        new_qty: i64,
        created_by: UserId,
    ) -> Result<Operation, ServiceError> {
        self.ensure_warehouse(warehouse)?;
        self.ensure_products([product])?;

        let old_qty = self
            .stock
            .get(product, warehouse)?
            .map(|l| l.quantity)
            .unwrap_or(0);

        let op = Operation::adjustment(
            OperationId::new(),
            product,
            warehouse,
            old_qty,
            new_qty,
            created_by,
            Utc::now(),
        )?;
        self.insert_pending(op)
    }

    fn insert_pending(&self, op: Operation) -> Result<Operation, ServiceError> {
        self.operations.insert(op.clone())?;
        tracing::info!(
            operation = %op.id,
            op_type = %op.op_type,
            lines = op.lines.len(),
            "operation created"
        );
        Ok(op)
    }

    // ── validation ─────────────────────────────────────────────────────

    /// Apply a pending operation: snapshot deltas through the mutator,
    /// ledger entries in planner order, then the `pending -> done` flip.
    ///
    /// The whole sequence runs under the per-operation lock, so two
    /// concurrent calls on the same id cannot both apply the effects. Every
    /// fallible check (operation exists, status is pending, line shapes,
    /// every referenced product and warehouse resolves) runs before the
    /// first mutation, so a failure leaves no partial state behind.
    pub fn validate_operation(
        &self,
        id: OperationId,
        validated_by: UserId,
    ) -> Result<ValidatedOperation, ServiceError> {
        let cell = self.op_locks.acquire(id)?;
        let _guard = cell
            .lock()
            .map_err(|_| StorageError::LockPoisoned("operation key".to_string()))?;

        let mut op = self.operations.get(id)?.ok_or(ServiceError::NotFound)?;

        match op.status {
            OperationStatus::Pending => {}
            OperationStatus::Done => return Err(ServiceError::AlreadyValidated),
            other => {
                return Err(ServiceError::Conflict(format!(
                    "operation is '{other}', not 'pending'"
                )))
            }
        }

        let effects = plan(&op)?;

        // Pre-flight: resolve every reference before touching anything.
        for effect in &effects {
            if self.products.get(effect.movement.product)?.is_none() {
                return Err(ServiceError::NotFound);
            }
            self.ensure_warehouse(effect.movement.warehouse)?;
            for wh in effect
                .draft
                .from_warehouse
                .into_iter()
                .chain(effect.draft.to_warehouse)
            {
                self.ensure_warehouse(wh)?;
            }
        }

        let now = Utc::now();
        let mut movements = Vec::with_capacity(effects.len());
        for effect in effects {
            let AppliedDelta {
                new_quantity,
                clamped_to_zero,
            } = self.mutator.apply_delta(
                effect.movement.product,
                effect.movement.warehouse,
                effect.movement.delta,
            )?;

            self.ledger.append(effect.draft.into_entry(
                LedgerEntryId::new(),
                op.op_type,
                op.id,
                now,
            ))?;

            movements.push(AppliedMovement {
                product: effect.movement.product,
                warehouse: effect.movement.warehouse,
                delta: effect.movement.delta,
                new_quantity,
                clamped_to_zero,
            });
        }

        op.mark_done(validated_by, now)?;
        self.operations.update(op.clone())?;

        tracing::info!(
            operation = %op.id,
            op_type = %op.op_type,
            movements = movements.len(),
            "operation validated"
        );

        Ok(ValidatedOperation {
            operation: op,
            movements,
        })
    }

    /// Abandon a pending operation (`pending -> canceled`). No stock
    /// effect; terminal.
    pub fn cancel_operation(&self, id: OperationId) -> Result<Operation, ServiceError> {
        let cell = self.op_locks.acquire(id)?;
        let _guard = cell
            .lock()
            .map_err(|_| StorageError::LockPoisoned("operation key".to_string()))?;

        let mut op = self.operations.get(id)?.ok_or(ServiceError::NotFound)?;
        op.mark_canceled(Utc::now())?;
        self.operations.update(op.clone())?;

        tracing::info!(operation = %op.id, "operation canceled");
        Ok(op)
    }

    // ── queries ────────────────────────────────────────────────────────

    pub fn operation(&self, id: OperationId) -> Result<Operation, ServiceError> {
        self.operations.get(id)?.ok_or(ServiceError::NotFound)
    }

    pub fn list_operations(&self, filter: &OperationFilter) -> Result<Vec<Operation>, ServiceError> {
        Ok(self.operations.list(filter)?)
    }

    /// Current quantity for one (product, warehouse) pair. A pair with no
    /// snapshot row reads as 0.
    pub fn stock_level(
        &self,
        product: ProductId,
        warehouse: WarehouseId,
    ) -> Result<i64, ServiceError> {
        self.ensure_products([product])?;
        self.ensure_warehouse(warehouse)?;
        Ok(self
            .stock
            .get(product, warehouse)?
            .map(|l| l.quantity)
            .unwrap_or(0))
    }

    /// Per-warehouse quantities for one product (pairs that have seen at
    /// least one mutation).
    pub fn stock_by_warehouse(&self, product: ProductId) -> Result<Vec<StockLevel>, ServiceError> {
        self.ensure_products([product])?;
        Ok(self.stock.for_product(product)?)
    }

    /// Audit trail, most recent first.
    pub fn ledger(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>, ServiceError> {
        Ok(self.ledger.query(filter)?)
    }

    // ── shared checks ──────────────────────────────────────────────────

    fn ensure_warehouse(&self, id: WarehouseId) -> Result<(), ServiceError> {
        if self.warehouses.get(id)?.is_none() {
            return Err(ServiceError::NotFound);
        }
        Ok(())
    }

    fn ensure_products(
        &self,
        ids: impl IntoIterator<Item = ProductId>,
    ) -> Result<(), ServiceError> {
        for id in ids {
            if self.products.get(id)?.is_none() {
                return Err(ServiceError::NotFound);
            }
        }
        Ok(())
    }
}
