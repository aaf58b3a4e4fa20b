use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use stockmaster_auth::Permission;
use stockmaster_core::OperationId;
use stockmaster_infra::OperationFilter;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_operations))
        .route("/receipts", post(create_receipt))
        .route("/deliveries", post(create_delivery))
        .route("/transfers", post(create_transfer))
        .route("/adjustments", post(create_adjustment))
        .route("/:id", get(get_operation))
        .route("/:id/validate", post(validate_operation))
        .route("/:id/cancel", post(cancel_operation))
}

pub async fn create_receipt(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::CreateReceiptRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("operations.create")) {
        return errors::authz_error_to_response(e);
    }
    if let Err(e) = authz::ensure_warehouse_scope(&actor, [body.to_warehouse]) {
        return errors::authz_error_to_response(e);
    }

    match services.inventory.create_receipt(
        body.to_warehouse,
        dto::to_lines(body.lines),
        actor.user_id(),
    ) {
        Ok(op) => (StatusCode::CREATED, Json(dto::operation_to_json(&op))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_delivery(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::CreateDeliveryRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("operations.create")) {
        return errors::authz_error_to_response(e);
    }
    if let Err(e) = authz::ensure_warehouse_scope(&actor, [body.from_warehouse]) {
        return errors::authz_error_to_response(e);
    }

    match services.inventory.create_delivery(
        body.from_warehouse,
        dto::to_lines(body.lines),
        actor.user_id(),
    ) {
        Ok(op) => (StatusCode::CREATED, Json(dto::operation_to_json(&op))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::CreateTransferRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("operations.create")) {
        return errors::authz_error_to_response(e);
    }
    if let Err(e) =
        authz::ensure_warehouse_scope(&actor, [body.from_warehouse, body.to_warehouse])
    {
        return errors::authz_error_to_response(e);
    }

    match services.inventory.create_transfer(
        body.from_warehouse,
        body.to_warehouse,
        dto::to_lines(body.lines),
        actor.user_id(),
    ) {
        Ok(op) => (StatusCode::CREATED, Json(dto::operation_to_json(&op))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_adjustment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::CreateAdjustmentRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("operations.create")) {
        return errors::authz_error_to_response(e);
    }
    if let Err(e) = authz::ensure_warehouse_scope(&actor, [body.warehouse]) {
        return errors::authz_error_to_response(e);
    }

    match services.inventory.create_adjustment(
        body.product,
        body.warehouse,
        body.new_qty,
        actor.user_id(),
    ) {
        Ok(op) => (StatusCode::CREATED, Json(dto::operation_to_json(&op))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn validate_operation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("operations.validate")) {
        return errors::authz_error_to_response(e);
    }

    let id: OperationId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid operation id")
        }
    };

    match services.inventory.validate_operation(id, actor.user_id()) {
        Ok(v) => (StatusCode::OK, Json(dto::validated_operation_to_json(&v))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn cancel_operation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("operations.cancel")) {
        return errors::authz_error_to_response(e);
    }

    let id: OperationId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid operation id")
        }
    };

    match services.inventory.cancel_operation(id) {
        Ok(op) => (StatusCode::OK, Json(dto::operation_to_json(&op))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_operation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("operations.read")) {
        return errors::authz_error_to_response(e);
    }

    let id: OperationId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid operation id")
        }
    };

    match services.inventory.operation(id) {
        Ok(op) => (StatusCode::OK, Json(dto::operation_to_json(&op))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct OperationsQuery {
    #[serde(rename = "type")]
    pub op_type: Option<String>,
    pub status: Option<String>,
}

pub async fn list_operations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<OperationsQuery>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("operations.read")) {
        return errors::authz_error_to_response(e);
    }

    let mut filter = OperationFilter::default();
    if let Some(t) = query.op_type.as_deref() {
        match t.parse() {
            Ok(t) => filter.op_type = Some(t),
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_type", "unknown operation type")
            }
        }
    }
    if let Some(s) = query.status.as_deref() {
        match s.parse() {
            Ok(s) => filter.status = Some(s),
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_status", "unknown operation status")
            }
        }
    }

    match services.inventory.list_operations(&filter) {
        Ok(ops) => {
            let items: Vec<_> = ops.iter().map(dto::operation_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
