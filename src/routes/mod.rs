//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The service exposes one selection per process: submit a GeoJSON shape,
//! read back the latest analysis, clear it. `/api/status` reports where the
//! current run is in its state machine.

pub mod selection;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// API routes with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/selection",
            get(selection::get_selection)
                .post(selection::create_selection)
                .delete(selection::delete_selection),
        )
        .route("/api/status", get(status))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub selection: Option<String>,
    pub phase: &'static str,
}

/// `GET /api/status`: active selection id and run phase.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let session = state.session();
    Json(StatusResponse {
        status: "ok",
        selection: session.selection().map(|s| s.id.to_string()),
        phase: session.phase().as_str(),
    })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
