//! The per-type movement planner.
//!
//! One pure function family turns a pending operation into the ordered list
//! of effects its validation must apply: a signed snapshot delta plus the
//! ledger draft that records it. The validator in infra executes the plan;
//! nothing here performs IO.

use serde::{Deserialize, Serialize};

use stockmaster_core::{DomainError, DomainResult, ProductId, WarehouseId};

use crate::ledger::LedgerDraft;
use crate::operation::{Operation, OperationLine, OperationType};

/// A single snapshot change: `delta` applied to (product, warehouse).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub product: ProductId,
    pub warehouse: WarehouseId,
    pub delta: i64,
}

/// One planned effect: the snapshot movement and the ledger draft written
/// alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEffect {
    pub movement: Movement,
    pub draft: LedgerDraft,
}

/// Plan the effects of validating `op`, per line, in line order.
///
/// | type | effects per line |
/// |---|---|
/// | receipt | `+qty` into `to` |
/// | delivery | `-qty` out of `from` |
/// | transfer | `-qty` out of `from`, then `+qty` into `to`; both drafts carry both warehouses |
/// | adjustment | signed `qty` against whichever warehouse the line carries |
///
/// Line shapes are re-checked here so a malformed record loaded from a
/// store fails before any effect is applied.
pub fn plan(op: &Operation) -> DomainResult<Vec<PlannedEffect>> {
    let mut effects = Vec::with_capacity(op.lines.len());
    for line in &op.lines {
        line.validate_shape(op.op_type)?;
        match op.op_type {
            OperationType::Receipt => effects.push(inbound(line)?),
            OperationType::Delivery => effects.push(outbound(line)?),
            OperationType::Transfer => {
                // Fixed order: outgoing entry first, incoming second.
                effects.push(transfer_leg(line, Leg::Outgoing)?);
                effects.push(transfer_leg(line, Leg::Incoming)?);
            }
            OperationType::Adjustment => effects.push(adjustment(line)?),
        }
    }
    Ok(effects)
}

fn require(warehouse: Option<WarehouseId>, what: &str) -> DomainResult<WarehouseId> {
    warehouse.ok_or_else(|| DomainError::validation(format!("line is missing {what}")))
}

fn inbound(line: &OperationLine) -> DomainResult<PlannedEffect> {
    let to = require(line.to_warehouse, "to_warehouse")?;
    Ok(PlannedEffect {
        movement: Movement {
            product: line.product,
            warehouse: to,
            delta: line.qty,
        },
        draft: LedgerDraft {
            product: line.product,
            qty: line.qty,
            from_warehouse: None,
            to_warehouse: Some(to),
        },
    })
}

fn outbound(line: &OperationLine) -> DomainResult<PlannedEffect> {
    let from = require(line.from_warehouse, "from_warehouse")?;
    Ok(PlannedEffect {
        movement: Movement {
            product: line.product,
            warehouse: from,
            delta: -line.qty,
        },
        draft: LedgerDraft {
            product: line.product,
            qty: -line.qty,
            from_warehouse: Some(from),
            to_warehouse: None,
        },
    })
}

enum Leg {
    Outgoing,
    Incoming,
}

fn transfer_leg(line: &OperationLine, leg: Leg) -> DomainResult<PlannedEffect> {
    let from = require(line.from_warehouse, "from_warehouse")?;
    let to = require(line.to_warehouse, "to_warehouse")?;
    let (warehouse, delta) = match leg {
        Leg::Outgoing => (from, -line.qty),
        Leg::Incoming => (to, line.qty),
    };
    Ok(PlannedEffect {
        movement: Movement {
            product: line.product,
            warehouse,
            delta,
        },
        // Both legs carry both warehouse fields on their ledger entries.
        draft: LedgerDraft {
            product: line.product,
            qty: delta,
            from_warehouse: Some(from),
            to_warehouse: Some(to),
        },
    })
}

fn adjustment(line: &OperationLine) -> DomainResult<PlannedEffect> {
    let warehouse = require(line.to_warehouse.or(line.from_warehouse), "a warehouse")?;
    Ok(PlannedEffect {
        movement: Movement {
            product: line.product,
            warehouse,
            delta: line.qty,
        },
        draft: LedgerDraft {
            product: line.product,
            qty: line.qty,
            from_warehouse: line.from_warehouse,
            to_warehouse: line.to_warehouse,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use stockmaster_core::{OperationId, UserId};

    fn actor() -> UserId {
        UserId::new()
    }

    #[test]
    fn receipt_plans_one_inbound_effect_per_line() {
        let wh = WarehouseId::new();
        let p1 = ProductId::new();
        let p2 = ProductId::new();
        let op = Operation::receipt(
            OperationId::new(),
            wh,
            vec![(p1, 100), (p2, 40)],
            actor(),
            Utc::now(),
        )
        .unwrap();

        let effects = plan(&op).unwrap();
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].movement.delta, 100);
        assert_eq!(effects[0].movement.warehouse, wh);
        assert_eq!(effects[0].draft.qty, 100);
        assert_eq!(effects[0].draft.from_warehouse, None);
        assert_eq!(effects[1].movement.product, p2);
    }

    #[test]
    fn delivery_plans_negative_deltas() {
        let wh = WarehouseId::new();
        let op = Operation::delivery(
            OperationId::new(),
            wh,
            vec![(ProductId::new(), 30)],
            actor(),
            Utc::now(),
        )
        .unwrap();

        let effects = plan(&op).unwrap();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].movement.delta, -30);
        assert_eq!(effects[0].draft.qty, -30);
        assert_eq!(effects[0].draft.to_warehouse, None);
    }

    #[test]
    fn transfer_plans_outgoing_before_incoming() {
        let from = WarehouseId::new();
        let to = WarehouseId::new();
        let product = ProductId::new();
        let op = Operation::transfer(
            OperationId::new(),
            from,
            to,
            vec![(product, 25)],
            actor(),
            Utc::now(),
        )
        .unwrap();

        let effects = plan(&op).unwrap();
        assert_eq!(effects.len(), 2);

        assert_eq!(effects[0].movement.warehouse, from);
        assert_eq!(effects[0].movement.delta, -25);
        assert_eq!(effects[1].movement.warehouse, to);
        assert_eq!(effects[1].movement.delta, 25);

        // Both ledger drafts carry both warehouse fields.
        for effect in &effects {
            assert_eq!(effect.draft.from_warehouse, Some(from));
            assert_eq!(effect.draft.to_warehouse, Some(to));
        }
    }

    #[test]
    fn adjustment_targets_the_carried_warehouse() {
        let wh = WarehouseId::new();
        let op = Operation::adjustment(
            OperationId::new(),
            ProductId::new(),
            wh,
            70,
            50,
            actor(),
            Utc::now(),
        )
        .unwrap();

        let effects = plan(&op).unwrap();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].movement.delta, -20);
        assert_eq!(effects[0].movement.warehouse, wh);
        assert_eq!(effects[0].draft.from_warehouse, Some(wh));
        assert_eq!(effects[0].draft.to_warehouse, None);
    }

    proptest! {
        #[test]
        fn transfer_deltas_cancel_out(qty in 1i64..1_000_000) {
            let op = Operation::transfer(
                OperationId::new(),
                WarehouseId::new(),
                WarehouseId::new(),
                vec![(ProductId::new(), qty)],
                UserId::new(),
                Utc::now(),
            ).unwrap();

            let effects = plan(&op).unwrap();
            prop_assert_eq!(effects.iter().map(|e| e.movement.delta).sum::<i64>(), 0);
            prop_assert_eq!(effects.iter().map(|e| e.draft.qty).sum::<i64>(), 0);
        }

        #[test]
        fn planned_ledger_qty_always_matches_movement_delta(
            qty in 1i64..1_000_000,
            kind in 0usize..3,
        ) {
            let op = match kind {
                0 => Operation::receipt(
                    OperationId::new(),
                    WarehouseId::new(),
                    vec![(ProductId::new(), qty)],
                    UserId::new(),
                    Utc::now(),
                ),
                1 => Operation::delivery(
                    OperationId::new(),
                    WarehouseId::new(),
                    vec![(ProductId::new(), qty)],
                    UserId::new(),
                    Utc::now(),
                ),
                _ => Operation::transfer(
                    OperationId::new(),
                    WarehouseId::new(),
                    WarehouseId::new(),
                    vec![(ProductId::new(), qty)],
                    UserId::new(),
                    Utc::now(),
                ),
            }
            .unwrap();

            for effect in plan(&op).unwrap() {
                prop_assert_eq!(effect.draft.qty, effect.movement.delta);
                prop_assert_eq!(effect.draft.product, effect.movement.product);
            }
        }
    }
}
