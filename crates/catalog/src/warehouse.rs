use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockmaster_core::{DomainError, DomainResult, Entity, UserId, WarehouseId};

/// A physical storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    /// Unique short code (e.g. "WH-NORTH"). Uniqueness is enforced by the store.
    pub code: String,
    pub location: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Warehouse {
    pub fn new(
        id: WarehouseId,
        name: impl Into<String>,
        code: impl Into<String>,
        location: impl Into<String>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let code = code.into();
        let location = location.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("warehouse name cannot be empty"));
        }
        if code.trim().is_empty() {
            return Err(DomainError::validation("warehouse code cannot be empty"));
        }
        if location.trim().is_empty() {
            return Err(DomainError::validation("warehouse location cannot be empty"));
        }

        Ok(Self {
            id,
            name,
            code,
            location,
            created_by,
            created_at: now,
        })
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
