use stockmaster_auth::Role;
use stockmaster_core::{UserId, WarehouseId};

/// Authenticated actor for a request.
///
/// This is immutable and must be present for all protected routes; the auth
/// middleware derives it from verified token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    user_id: UserId,
    role: Role,
    assigned_warehouse: Option<WarehouseId>,
}

impl ActorContext {
    pub fn new(user_id: UserId, role: Role, assigned_warehouse: Option<WarehouseId>) -> Self {
        Self {
            user_id,
            role,
            assigned_warehouse,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn assigned_warehouse(&self) -> Option<WarehouseId> {
        self.assigned_warehouse
    }
}
