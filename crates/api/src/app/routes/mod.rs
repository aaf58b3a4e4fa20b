//! HTTP routes, one file per domain area.

use axum::{routing::get, Router};

pub mod ledger;
pub mod operations;
pub mod products;
pub mod stock;
pub mod system;
pub mod warehouses;

/// The protected route tree (auth middleware is layered on by `app`).
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/operations", operations::router())
        .nest("/stock", stock::router())
        .nest("/ledger", ledger::router())
        .nest("/products", products::router())
        .nest("/warehouses", warehouses::router())
}
