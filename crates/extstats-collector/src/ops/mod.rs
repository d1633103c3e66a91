//! Operational HTTP endpoints.
//!
//! - `/health` : liveness, `{status: "ok", timestamp}`

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use extstats_core::now_millis;

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "timestamp": now_millis() })),
    )
}
