use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockmaster_auth::Permission;
use stockmaster_core::WarehouseId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_warehouse).get(list_warehouses))
        .route("/:id", get(get_warehouse))
}

pub async fn create_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::CreateWarehouseRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("warehouses.write")) {
        return errors::authz_error_to_response(e);
    }

    match services
        .catalog
        .create_warehouse(body.name, body.code, body.location, actor.user_id())
    {
        Ok(warehouse) => {
            (StatusCode::CREATED, Json(dto::warehouse_to_json(&warehouse))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_warehouses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("warehouses.read")) {
        return errors::authz_error_to_response(e);
    }

    match services.catalog.list_warehouses() {
        Ok(warehouses) => {
            let items: Vec<_> = warehouses.iter().map(dto::warehouse_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("warehouses.read")) {
        return errors::authz_error_to_response(e);
    }

    let id: WarehouseId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid warehouse id")
        }
    };

    match services.catalog.warehouse(id) {
        Ok(warehouse) => (StatusCode::OK, Json(dto::warehouse_to_json(&warehouse))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
