//! `stockmaster-inventory` — the operation-to-ledger domain core.
//!
//! Pure domain logic only: operations and their lifecycle, the clamp
//! arithmetic for snapshot quantities, the per-type movement planner, and
//! the ledger entry model. All IO (stores, locking, orchestration) lives in
//! `stockmaster-infra`.

pub mod ledger;
pub mod operation;
pub mod plan;
pub mod stock;

pub use ledger::{LedgerDraft, LedgerEntry, LedgerFilter};
pub use operation::{Operation, OperationLine, OperationStatus, OperationType};
pub use plan::{plan, Movement, PlannedEffect};
pub use stock::{apply_delta, AppliedDelta, StockLevel};
