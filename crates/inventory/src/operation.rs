use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockmaster_core::{DomainError, DomainResult, Entity, OperationId, ProductId, UserId, WarehouseId};

/// Kind of inventory movement an operation requests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Goods entering a warehouse from outside the system.
    Receipt,
    /// Goods leaving a warehouse.
    Delivery,
    /// Goods moving between two warehouses.
    Transfer,
    /// A signed correction towards a counted quantity.
    Adjustment,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Receipt => "receipt",
            OperationType::Delivery => "delivery",
            OperationType::Transfer => "transfer",
            OperationType::Adjustment => "adjustment",
        }
    }
}

impl core::fmt::Display for OperationType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OperationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receipt" => Ok(OperationType::Receipt),
            "delivery" => Ok(OperationType::Delivery),
            "transfer" => Ok(OperationType::Transfer),
            "adjustment" => Ok(OperationType::Adjustment),
            other => Err(DomainError::validation(format!(
                "unknown operation type '{other}'"
            ))),
        }
    }
}

/// Operation lifecycle status.
///
/// `ready` and `late` are carried for records that hold them but have no
/// outgoing transition here; `done` and `canceled` are terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Pending,
    Ready,
    Late,
    Done,
    Canceled,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Pending => "pending",
            OperationStatus::Ready => "ready",
            OperationStatus::Late => "late",
            OperationStatus::Done => "done",
            OperationStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OperationStatus::Done | OperationStatus::Canceled)
    }

    fn allows(self, next: OperationStatus) -> bool {
        matches!(
            (self, next),
            (OperationStatus::Pending, OperationStatus::Done)
                | (OperationStatus::Pending, OperationStatus::Canceled)
        )
    }

    /// The single transition function over the explicit table.
    ///
    /// Every status change must come through here; there are no ad hoc
    /// status writes elsewhere.
    pub fn transition(self, next: OperationStatus) -> DomainResult<OperationStatus> {
        if self.allows(next) {
            return Ok(next);
        }
        match self {
            OperationStatus::Done => Err(DomainError::AlreadyValidated),
            _ => Err(DomainError::conflict(format!(
                "no transition from '{}' to '{}'",
                self.as_str(),
                next.as_str()
            ))),
        }
    }
}

impl core::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OperationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OperationStatus::Pending),
            "ready" => Ok(OperationStatus::Ready),
            "late" => Ok(OperationStatus::Late),
            "done" => Ok(OperationStatus::Done),
            "canceled" => Ok(OperationStatus::Canceled),
            other => Err(DomainError::validation(format!(
                "unknown operation status '{other}'"
            ))),
        }
    }
}

/// One product-and-quantity entry within an operation.
///
/// Which warehouse fields are populated depends on the operation type; see
/// [`OperationLine::validate_shape`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLine {
    pub product: ProductId,
    /// For receipt/delivery/transfer: the (strictly positive) moved amount.
    /// For adjustment: the signed delta fixed at creation time.
    pub qty: i64,
    pub from_warehouse: Option<WarehouseId>,
    pub to_warehouse: Option<WarehouseId>,
}

impl OperationLine {
    /// Check that the populated warehouse fields match the operation type.
    pub fn validate_shape(&self, op_type: OperationType) -> DomainResult<()> {
        match op_type {
            OperationType::Receipt => {
                if self.from_warehouse.is_some() || self.to_warehouse.is_none() {
                    return Err(DomainError::validation(
                        "receipt line must carry to_warehouse only",
                    ));
                }
                if self.qty <= 0 {
                    return Err(DomainError::validation("receipt qty must be positive"));
                }
            }
            OperationType::Delivery => {
                if self.from_warehouse.is_none() || self.to_warehouse.is_some() {
                    return Err(DomainError::validation(
                        "delivery line must carry from_warehouse only",
                    ));
                }
                if self.qty <= 0 {
                    return Err(DomainError::validation("delivery qty must be positive"));
                }
            }
            OperationType::Transfer => {
                if self.from_warehouse.is_none() || self.to_warehouse.is_none() {
                    return Err(DomainError::validation(
                        "transfer line must carry both warehouses",
                    ));
                }
                if self.from_warehouse == self.to_warehouse {
                    return Err(DomainError::validation(
                        "transfer warehouses must differ",
                    ));
                }
                if self.qty <= 0 {
                    return Err(DomainError::validation("transfer qty must be positive"));
                }
            }
            OperationType::Adjustment => {
                // Exactly one warehouse, chosen by the sign of the delta.
                let expect_to = self.qty >= 0;
                if expect_to && (self.to_warehouse.is_none() || self.from_warehouse.is_some()) {
                    return Err(DomainError::validation(
                        "non-negative adjustment must carry to_warehouse only",
                    ));
                }
                if !expect_to && (self.from_warehouse.is_none() || self.to_warehouse.is_some()) {
                    return Err(DomainError::validation(
                        "negative adjustment must carry from_warehouse only",
                    ));
                }
            }
        }
        Ok(())
    }

    /// The warehouses this line touches, for scoping and existence checks.
    pub fn warehouses(&self) -> impl Iterator<Item = WarehouseId> + '_ {
        self.from_warehouse.into_iter().chain(self.to_warehouse)
    }
}

/// A requested inventory movement.
///
/// Created `pending` with no stock effect; the validator in infra later
/// applies the lines and flips the status to `done` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    pub op_type: OperationType,
    pub status: OperationStatus,
    pub lines: Vec<OperationLine>,
    pub created_by: UserId,
    pub validated_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Operation {
    fn pending(
        id: OperationId,
        op_type: OperationType,
        lines: Vec<OperationLine>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("operation must have at least one line"));
        }
        for line in &lines {
            line.validate_shape(op_type)?;
        }
        Ok(Self {
            id,
            op_type,
            status: OperationStatus::Pending,
            lines,
            created_by,
            validated_by: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Goods in: every line lands in `to_warehouse`.
    pub fn receipt(
        id: OperationId,
        to_warehouse: WarehouseId,
        lines: Vec<(ProductId, i64)>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let lines = lines
            .into_iter()
            .map(|(product, qty)| OperationLine {
                product,
                qty,
                from_warehouse: None,
                to_warehouse: Some(to_warehouse),
            })
            .collect();
        Self::pending(id, OperationType::Receipt, lines, created_by, now)
    }

    /// Goods out: every line leaves `from_warehouse`.
    pub fn delivery(
        id: OperationId,
        from_warehouse: WarehouseId,
        lines: Vec<(ProductId, i64)>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let lines = lines
            .into_iter()
            .map(|(product, qty)| OperationLine {
                product,
                qty,
                from_warehouse: Some(from_warehouse),
                to_warehouse: None,
            })
            .collect();
        Self::pending(id, OperationType::Delivery, lines, created_by, now)
    }

    /// Warehouse-to-warehouse move.
    pub fn transfer(
        id: OperationId,
        from_warehouse: WarehouseId,
        to_warehouse: WarehouseId,
        lines: Vec<(ProductId, i64)>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let lines = lines
            .into_iter()
            .map(|(product, qty)| OperationLine {
                product,
                qty,
                from_warehouse: Some(from_warehouse),
                to_warehouse: Some(to_warehouse),
            })
            .collect();
        Self::pending(id, OperationType::Transfer, lines, created_by, now)
    }

    /// Correction towards a counted quantity.
    ///
    /// The signed delta `new_qty - old_qty` is fixed here, at creation time,
    /// and stored on the single line; the warehouse field is chosen by the
    /// delta's sign.
    pub fn adjustment(
        id: OperationId,
        product: ProductId,
        warehouse: WarehouseId,
        old_qty: i64,
        new_qty: i64,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if new_qty < 0 {
            return Err(DomainError::validation("counted quantity cannot be negative"));
        }
        let delta = new_qty - old_qty;
        let line = if delta >= 0 {
            OperationLine {
                product,
                qty: delta,
                from_warehouse: None,
                to_warehouse: Some(warehouse),
            }
        } else {
            OperationLine {
                product,
                qty: delta,
                from_warehouse: Some(warehouse),
                to_warehouse: None,
            }
        };
        Self::pending(id, OperationType::Adjustment, vec![line], created_by, now)
    }

    /// Record a successful validation: `pending -> done`, exactly once.
    pub fn mark_done(&mut self, validated_by: UserId, now: DateTime<Utc>) -> DomainResult<()> {
        self.status = self.status.transition(OperationStatus::Done)?;
        self.validated_by = Some(validated_by);
        self.updated_at = now;
        Ok(())
    }

    /// Abandon a pending operation: `pending -> canceled`.
    pub fn mark_canceled(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.status = self.status.transition(OperationStatus::Canceled)?;
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Operation {
    type Id = OperationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
