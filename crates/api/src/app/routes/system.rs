use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::ActorContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(actor): Extension<ActorContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": actor.user_id().to_string(),
        "role": actor.role().as_str(),
        "assigned_warehouse": actor.assigned_warehouse().map(|w| w.to_string()),
    }))
}
