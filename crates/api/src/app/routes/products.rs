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
use stockmaster_core::{ProductId, WarehouseId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product).put(update_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("products.write")) {
        return errors::authz_error_to_response(e);
    }

    match services.catalog.create_product(
        body.name,
        body.sku,
        body.category,
        body.unit,
        body.reorder_level.unwrap_or(0),
    ) {
        Ok(product) => (StatusCode::CREATED, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
    pub warehouse: Option<String>,
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<ProductsQuery>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("products.read")) {
        return errors::authz_error_to_response(e);
    }

    let stocked_in: Option<WarehouseId> = match query.warehouse.as_deref() {
        Some(raw) => match raw.parse() {
            Ok(w) => Some(w),
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid warehouse id")
            }
        },
        None => None,
    };

    match services
        .catalog
        .list_products(query.category.as_deref(), stocked_in)
    {
        Ok(products) => {
            let items: Vec<_> = products.iter().map(dto::product_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("products.read")) {
        return errors::authz_error_to_response(e);
    }

    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };

    match services.catalog.product(id) {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::authorize_actor(&actor, &Permission::new("products.write")) {
        return errors::authz_error_to_response(e);
    }

    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };

    match services.catalog.update_product(id, body.into()) {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
