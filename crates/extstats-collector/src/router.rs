//! Axum router wiring.
//!
//! - `/`                         : dashboard page
//! - `/health`                   : liveness
//! - `/stats`, `/api/stats`      : report ingestion (POST)
//! - `/stats/summary`, `/api/stats` : summary (GET)
//!
//! CORS is wide open: reports come from an extension running on arbitrary sites.

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{api, app_state::AppState, dashboard, ops};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(dashboard::index))
        .route("/health", get(ops::health))
        .route("/stats", post(api::stats::report))
        .route("/stats/summary", get(api::stats::summary))
        .route("/api/stats", get(api::stats::summary).post(api::stats::report))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
