//! Selection routes: submit, read back, and clear the active selection.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use analysis::{AnalysisReport, ErrorCode, ErrorReport, Geometry, GeometryError, RunOutcome, SelectionOrigin, run_analysis};

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SubmitParams {
    #[serde(default)]
    pub origin: SelectionOrigin,
}

/// Body returned with 409 when a newer selection won the race.
#[derive(Debug, Serialize)]
pub struct SupersededBody {
    pub code: &'static str,
    pub message: &'static str,
    pub token: u64,
}

#[derive(Debug)]
pub enum SelectionResponse {
    Analyzed(Box<AnalysisReport>),
    Superseded(u64),
    Invalid(StatusCode, ErrorReport),
}

impl IntoResponse for SelectionResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Analyzed(report) => (StatusCode::OK, Json(*report)).into_response(),
            Self::Superseded(token) => (
                StatusCode::CONFLICT,
                Json(SupersededBody {
                    code: "E_SUPERSEDED",
                    message: "a newer selection replaced this one before analysis finished",
                    token,
                }),
            )
                .into_response(),
            Self::Invalid(status, error) => (status, Json(error)).into_response(),
        }
    }
}

/// `POST /api/selection`: analyze a GeoJSON polygon as the new selection.
///
/// The body is parsed before the session is touched, so a rejected shape
/// leaves the previous selection and result in place.
pub async fn create_selection(
    State(state): State<AppState>,
    Query(params): Query<SubmitParams>,
    body: String,
) -> SelectionResponse {
    let geometry = match Geometry::from_geojson_str(&body) {
        Ok(geometry) => geometry,
        Err(e) => return reject(&e),
    };

    match run_analysis(&state.session, state.source.as_ref(), geometry, params.origin).await {
        RunOutcome::Current(report) => SelectionResponse::Analyzed(report),
        RunOutcome::Superseded { token } => SelectionResponse::Superseded(token.get()),
    }
}

/// `GET /api/selection`: latest published analysis.
pub async fn get_selection(State(state): State<AppState>) -> Result<Json<AnalysisReport>, StatusCode> {
    state
        .session()
        .latest()
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// `DELETE /api/selection`: drop the selection; in-flight runs are discarded.
pub async fn delete_selection(State(state): State<AppState>) -> StatusCode {
    state.session().clear();
    tracing::info!("selection cleared");
    StatusCode::NO_CONTENT
}

fn reject(error: &GeometryError) -> SelectionResponse {
    tracing::warn!(code = error.error_code(), error = %error, "selection rejected");
    SelectionResponse::Invalid(geometry_error_to_status(error), ErrorReport::from_error(error))
}

/// Unparseable bodies are 400; well-formed shapes that cannot be analyzed are 422.
fn geometry_error_to_status(error: &GeometryError) -> StatusCode {
    match error {
        GeometryError::GeoJson(_) => StatusCode::BAD_REQUEST,
        GeometryError::TooFewVertices { .. }
        | GeometryError::NonFinite { .. }
        | GeometryError::OutOfRange { .. }
        | GeometryError::Unsupported(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

#[cfg(test)]
#[path = "selection_test.rs"]
mod tests;
