//! Behavior tests for the HTTP surface: liveness and the Prometheus text
//! exposition after a real harvest.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use devpulse_tests::*;

async fn get(router: axum::Router, path: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::get(path).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, String::from_utf8(bytes.to_vec()).expect("utf8"))
}

#[tokio::test]
async fn liveness_probe_answers_ok() {
    let metrics = HarvestMetrics::shared().expect("metrics");
    let (status, body) = get(devpulse_web::router(metrics), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn metrics_exposition_reflects_a_finished_harvest() {
    let client = Arc::new(ScriptedHttpClient::new().on(
        "issues?page=1",
        vec![Ok(HttpResponse::ok_json(issues_page(&[1, 2])))],
    ));
    let rig = harvest_rig(client);

    rig.harvester
        .harvest_issues(&repo("golang", "go"), WindowTag::All)
        .await
        .expect("walk succeeds");

    let (status, body) = get(devpulse_web::router(Arc::clone(&rig.metrics)), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("devpulse_api_calls_persecond_total"));
    assert!(body.contains("devpulse_data_collected_gigabytes_persecond_total"));
    assert!(body.contains(r#"source="github""#));
    assert!(body.contains(r#"scope="golang/go""#));
    assert!(body.contains(r#"window="all""#));
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let metrics = HarvestMetrics::shared().expect("metrics");
    let (status, _) = get(devpulse_web::router(metrics), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
