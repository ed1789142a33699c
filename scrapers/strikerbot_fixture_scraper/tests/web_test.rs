use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use chrono::Utc;
use pretty_assertions::assert_eq;
use std::{fs, path::Path};
use tower::ServiceExt;

use strikerbot_fixture_scraper::{
    config::ScraperConfig,
    pipeline::{PassStatus, StatusReport},
    web::{router, AppState},
};

const DASHBOARD: &str = include_str!("fixtures/gt_dashboard.html");

fn state_for(dir: &Path) -> AppState {
    let mut config = ScraperConfig::default();
    config.snapshot.path = dir.join("latest.html");
    config.output.dir = dir.join("out");
    let initial = StatusReport::failure("not run yet", &config.window, Utc::now());
    AppState::new(config, initial)
}

async fn get(state: &AppState, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router(state.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
}

#[test_log::test(tokio::test)]
async fn test_fixtures_endpoint_runs_a_pass() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(dir.path());
    fs::write(dir.path().join("latest.html"), DASHBOARD).unwrap();

    let (status, body) = get(&state, "/fixtures").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());

    let report = state.last_report();
    assert_eq!(report.status, PassStatus::Success);
    assert_eq!(report.players_count, 3);
    assert_eq!(state.metrics.get_metrics().successful_passes, 1);
}

#[test_log::test(tokio::test)]
async fn test_missing_snapshot_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(dir.path());

    let (status, body) = get(&state, "/fixtures").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
    assert_eq!(body["fixtures_count"], 0);
    assert!(body["error_message"].as_str().unwrap().contains("No snapshot"));

    let (status, body) = get(&state, "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");

    let (_, metrics) = get(&state, "/metrics").await;
    assert_eq!(metrics["failed_passes"], 1);
}

#[tokio::test]
async fn test_players_endpoint_is_ranked() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(dir.path());
    fs::write(dir.path().join("latest.html"), DASHBOARD).unwrap();

    let (status, body) = get(&state, "/players").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["player"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Kano", "Boki", "Jack"]);
}

#[tokio::test]
async fn test_health_and_index() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(dir.path());

    let (status, body) = get(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let response = router(state.clone())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(page.to_vec()).unwrap();
    assert!(page.contains("StrikerBot Command Center"));
    assert!(page.contains("Last Error"));
}
