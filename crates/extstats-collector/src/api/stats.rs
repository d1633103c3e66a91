//! Report ingestion and summary handlers.
//!
//! Any report failure (malformed body, unknown type, bad count) answers 500
//! with a generic body; details only go to the log.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use extstats_core::error::Result;
use extstats_core::{decode_report, Report, Summary};

use crate::app_state::AppState;

pub async fn report(State(state): State<AppState>, body: Bytes) -> Response {
    match apply_report(&state, &body).await {
        Ok(out) => (StatusCode::OK, Json(out)).into_response(),
        Err(e) => {
            tracing::error!(code = e.client_code().as_str(), error = %e, "error processing stats");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to process stats" })),
            )
                .into_response()
        }
    }
}

async fn apply_report(state: &AppState, body: &[u8]) -> Result<Value> {
    let report = decode_report(body)?;
    tracing::debug!(kind = report.kind().as_str(), "stats report");
    let store = state.store();
    match report {
        Report::Install { client_id } => {
            let counted = store.record_install(&client_id).await?;
            Ok(json!({ "success": true, "counted": counted }))
        }
        Report::Filter { count } => {
            store.record_filtered(count).await?;
            Ok(json!({ "success": true }))
        }
    }
}

pub async fn summary(State(state): State<AppState>) -> Json<Summary> {
    Json(state.store().summary().await)
}
