use thiserror::Error;

use crate::{Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),

    #[error("forbidden: actor is not allowed to operate on this warehouse")]
    WarehouseScope,
}

/// Permissions granted to a role.
///
/// Managers hold the wildcard; staff can read everything and request
/// movements, but cannot commit them or change reference data.
pub fn role_permissions(role: &Role) -> Vec<Permission> {
    match role.as_str() {
        "manager" => vec![Permission::new("*")],
        "staff" => vec![
            Permission::new("operations.create"),
            Permission::new("operations.read"),
            Permission::new("stock.read"),
            Permission::new("ledger.read"),
            Permission::new("products.read"),
            Permission::new("warehouses.read"),
        ],
        _ => vec![],
    }
}

/// Authorize a role against a required permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(role: &Role, required: &Permission) -> Result<(), AuthzError> {
    let granted = role_permissions(role);
    if granted.iter().any(|p| p.is_wildcard() || p == required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
