use analysis::SelectionOrigin;

use super::*;
use crate::state::test_helpers::*;

#[tokio::test]
async fn healthz_is_ok() {
    assert_eq!(healthz().await, StatusCode::OK);
}

#[tokio::test]
async fn status_reports_idle_without_selection() {
    let Json(body) = status(State(test_app_state())).await;
    assert_eq!(body.status, "ok");
    assert!(body.selection.is_none());
    assert_eq!(body.phase, "idle");
}

#[tokio::test]
async fn status_reports_done_after_analysis() {
    let state = test_app_state();
    let geometry = analysis::Geometry::from_geojson_str(&square_geojson(0.0, 0.0)).unwrap();
    analysis::run_analysis(&state.session, state.source.as_ref(), geometry, SelectionOrigin::Drawn).await;

    let Json(body) = status(State(state.clone())).await;
    assert_eq!(body.phase, "done");
    let expected = state.session().selection().map(|s| s.id.to_string());
    assert_eq!(body.selection, expected);
}

#[test]
fn status_serializes_null_selection() {
    let body = StatusResponse { status: "ok", selection: None, phase: "idle" };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json, serde_json::json!({"status": "ok", "selection": null, "phase": "idle"}));
}

#[test]
fn app_builds_with_test_state() {
    let _router = app(test_app_state());
}
