use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockmaster_auth::Permission;
use stockmaster_core::{ProductId, WarehouseId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/:product_id", get(stock_by_warehouse))
        .route("/:product_id/:warehouse_id", get(stock_level))
}

/// Per-warehouse quantities for one product.
pub async fn stock_by_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("stock.read")) {
        return errors::authz_error_to_response(e);
    }

    let product: ProductId = match product_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };

    match services.inventory.stock_by_warehouse(product) {
        Ok(levels) => {
            let items: Vec<_> = levels.iter().map(dto::stock_level_to_json).collect();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "product": product.to_string(),
                    "warehouses": items,
                })),
            )
                .into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Current quantity for one (product, warehouse) pair.
pub async fn stock_level(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path((product_id, warehouse_id)): Path<(String, String)>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("stock.read")) {
        return errors::authz_error_to_response(e);
    }

    let product: ProductId = match product_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };
    let warehouse: WarehouseId = match warehouse_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid warehouse id")
        }
    };

    match services.inventory.stock_level(product, warehouse) {
        Ok(quantity) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "product": product.to_string(),
                "warehouse": warehouse.to_string(),
                "quantity": quantity,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
