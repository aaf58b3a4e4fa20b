use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use stockmaster_auth::Permission;
use stockmaster_inventory::LedgerFilter;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_ledger))
}

#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    pub product: Option<String>,
    pub warehouse: Option<String>,
    #[serde(rename = "type")]
    pub op_type: Option<String>,
}

/// Full movement history, most recent first.
pub async fn list_ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<LedgerQuery>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("ledger.read")) {
        return errors::authz_error_to_response(e);
    }

    let mut filter = LedgerFilter::default();
    if let Some(product) = query.product.as_deref() {
        match product.parse() {
            Ok(p) => filter.product = Some(p),
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
            }
        }
    }
    if let Some(warehouse) = query.warehouse.as_deref() {
        match warehouse.parse() {
            Ok(w) => filter.warehouse = Some(w),
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid warehouse id")
            }
        }
    }
    if let Some(op_type) = query.op_type.as_deref() {
        match op_type.parse() {
            Ok(t) => filter.op_type = Some(t),
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_type", "unknown operation type")
            }
        }
    }

    match services.inventory.ledger(&filter) {
        Ok(entries) => {
            let items: Vec<_> = entries.iter().map(dto::ledger_entry_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
