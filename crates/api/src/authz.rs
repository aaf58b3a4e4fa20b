//! Request-level authorization checks.
//!
//! Pure policy: role -> permission via `stockmaster-auth`, plus the
//! warehouse scoping rule for staff. The inventory core trusts that these
//! checks ran before it is invoked.

use stockmaster_auth::{authorize, AuthzError, Permission};
use stockmaster_core::WarehouseId;

use crate::context::ActorContext;

/// Check that the actor's role grants `required`.
pub fn authorize_actor(actor: &ActorContext, required: &Permission) -> Result<(), AuthzError> {
    authorize(actor.role(), required)
}

/// Staff may only operate on their assigned warehouse; managers are
/// unrestricted. Every warehouse an operation touches must be in scope.
pub fn ensure_warehouse_scope(
    actor: &ActorContext,
    touched: impl IntoIterator<Item = WarehouseId>,
) -> Result<(), AuthzError> {
    if actor.role() == &stockmaster_auth::Role::manager() {
        return Ok(());
    }

    let assigned = actor.assigned_warehouse().ok_or(AuthzError::WarehouseScope)?;
    for warehouse in touched {
        if warehouse != assigned {
            return Err(AuthzError::WarehouseScope);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockmaster_auth::Role;
    use stockmaster_core::UserId;

    #[test]
    fn manager_ignores_warehouse_scope() {
        let actor = ActorContext::new(UserId::new(), Role::manager(), None);
        assert!(ensure_warehouse_scope(&actor, [WarehouseId::new()]).is_ok());
    }

    #[test]
    fn staff_without_assignment_is_rejected() {
        let actor = ActorContext::new(UserId::new(), Role::staff(), None);
        assert_eq!(
            ensure_warehouse_scope(&actor, [WarehouseId::new()]),
            Err(AuthzError::WarehouseScope)
        );
    }

    #[test]
    fn staff_is_limited_to_assigned_warehouse() {
        let assigned = WarehouseId::new();
        let actor = ActorContext::new(UserId::new(), Role::staff(), Some(assigned));

        assert!(ensure_warehouse_scope(&actor, [assigned]).is_ok());
        assert_eq!(
            ensure_warehouse_scope(&actor, [assigned, WarehouseId::new()]),
            Err(AuthzError::WarehouseScope)
        );
    }
}
