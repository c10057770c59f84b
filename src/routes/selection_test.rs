use std::time::Duration;

use analysis::AnalysisPhase;
use axum::extract::{Query, State};

use super::*;
use crate::state::test_helpers::*;

fn drawn() -> Query<SubmitParams> {
    Query(SubmitParams::default())
}

fn edited() -> Query<SubmitParams> {
    Query(SubmitParams { origin: SelectionOrigin::Edited })
}

#[tokio::test]
async fn create_selection_returns_report_and_publishes_it() {
    let state = test_app_state();
    let response = create_selection(State(state.clone()), drawn(), square_geojson(0.0, 0.0)).await;

    let SelectionResponse::Analyzed(report) = response else {
        panic!("expected analyzed response");
    };
    assert!(report.metrics.area_m2 > 0.0);
    assert!(report.breakdown().is_some_and(analysis::Breakdown::is_empty));

    let session = state.session();
    assert_eq!(session.phase(), AnalysisPhase::Done);
    assert_eq!(session.latest().map(|r| r.selection_id), Some(report.selection_id));
}

#[tokio::test]
async fn create_selection_honors_edited_origin() {
    let state = test_app_state();
    let response = create_selection(State(state), edited(), square_geojson(0.0, 0.0)).await;
    assert!(matches!(response, SelectionResponse::Analyzed(ref r) if r.origin == SelectionOrigin::Edited));
}

#[tokio::test]
async fn fetch_failure_still_returns_metrics() {
    let state = test_app_state_with(MockSource { features: Vec::new(), fail_status: Some(500), delay: None });
    let response = create_selection(State(state), drawn(), square_geojson(0.0, 0.0)).await;

    let SelectionResponse::Analyzed(report) = response else {
        panic!("expected analyzed response");
    };
    assert!(report.metrics.perimeter_m > 0.0);
    assert_eq!(report.fetch_error().map(|e| e.code.as_str()), Some("E_FEATURE_STATUS"));
}

#[tokio::test]
async fn invalid_shape_is_unprocessable_and_keeps_previous_selection() {
    let state = test_app_state();
    create_selection(State(state.clone()), drawn(), square_geojson(0.0, 0.0)).await;
    let before = state.session().latest().map(|r| r.selection_id);

    let body = r#"{"type":"Polygon","coordinates":[[[0,0],[1,1],[0,0]]]}"#;
    let response = create_selection(State(state.clone()), drawn(), body.to_owned()).await;

    let SelectionResponse::Invalid(status, error) = response else {
        panic!("expected invalid response");
    };
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error.code, "E_TOO_FEW_VERTICES");
    assert!(error.message.starts_with("cannot analyze this shape"));
    assert_eq!(state.session().latest().map(|r| r.selection_id), before);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let state = test_app_state();
    let response = create_selection(State(state), drawn(), "not json".to_owned()).await;
    assert!(matches!(response, SelectionResponse::Invalid(status, ref e) if status == StatusCode::BAD_REQUEST && e.code == "E_GEOJSON_PARSE"));
}

#[tokio::test]
async fn point_geometry_is_unsupported() {
    let state = test_app_state();
    let body = r#"{"type":"Point","coordinates":[0,0]}"#.to_owned();
    let response = create_selection(State(state), drawn(), body).await;
    assert!(matches!(response, SelectionResponse::Invalid(status, _) if status == StatusCode::UNPROCESSABLE_ENTITY));
}

#[tokio::test]
async fn older_submission_is_superseded_by_newer() {
    let state = test_app_state_with(MockSource {
        features: Vec::new(),
        fail_status: None,
        delay: Some(Duration::from_millis(30)),
    });

    let (first, second) = tokio::join!(
        create_selection(State(state.clone()), drawn(), square_geojson(0.0, 0.0)),
        create_selection(State(state.clone()), edited(), square_geojson(1.0, 1.0)),
    );

    assert!(matches!(first, SelectionResponse::Superseded(1)));
    let SelectionResponse::Analyzed(report) = second else {
        panic!("expected newer submission to publish");
    };
    assert_eq!(state.session().latest().map(|r| r.selection_id), Some(report.selection_id));
}

#[tokio::test]
async fn get_selection_is_not_found_until_published() {
    let state = test_app_state();
    assert_eq!(get_selection(State(state.clone())).await.unwrap_err(), StatusCode::NOT_FOUND);

    create_selection(State(state.clone()), drawn(), square_geojson(0.0, 0.0)).await;
    let Json(report) = get_selection(State(state)).await.unwrap();
    assert!(report.metrics.area_m2 > 0.0);
}

#[tokio::test]
async fn delete_selection_clears_result() {
    let state = test_app_state();
    create_selection(State(state.clone()), drawn(), square_geojson(0.0, 0.0)).await;

    assert_eq!(delete_selection(State(state.clone())).await, StatusCode::NO_CONTENT);
    assert_eq!(get_selection(State(state.clone())).await.unwrap_err(), StatusCode::NOT_FOUND);
    assert!(state.session().selection().is_none());
}

#[test]
fn superseded_response_is_conflict() {
    let response = SelectionResponse::Superseded(3).into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[test]
fn geometry_errors_map_to_status() {
    assert_eq!(geometry_error_to_status(&GeometryError::GeoJson("x".into())), StatusCode::BAD_REQUEST);
    assert_eq!(
        geometry_error_to_status(&GeometryError::TooFewVertices { distinct: 2 }),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(geometry_error_to_status(&GeometryError::NonFinite { index: 0 }), StatusCode::UNPROCESSABLE_ENTITY);
}
