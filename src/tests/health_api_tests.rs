use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn_with_state,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use super::test_state;
use crate::middleware::security_headers::security_headers_middleware;
use crate::routes;

async fn setup_app() -> Router {
    let state = test_state().await;
    routes::api_router(state.clone())
        .layer(from_fn_with_state(state.config.clone(), security_headers_middleware))
}

#[tokio::test]
async fn healthz_is_ok() {
    let app = setup_app().await;
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn readyz_reports_ready_with_database() {
    let app = setup_app().await;
    let response = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ready");
}

#[tokio::test]
async fn metrics_snapshot_has_expected_fields() {
    let app = setup_app().await;
    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["signups"], 0);
    assert_eq!(json["logins_succeeded"], 0);
    assert_eq!(json["csrf_rejections"], 0);
    assert_eq!(json["rate_limited"], 0);
    assert!(json["uptime_seconds"].as_u64().is_some());
}

#[tokio::test]
async fn prometheus_exposition_lists_counters() {
    let app = setup_app().await;
    let response = app
        .oneshot(Request::builder().uri("/metrics/prometheus").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("bankwacht_signups 0"));
    assert!(text.contains("bankwacht_rate_limited 0"));
    assert!(text.contains("bankwacht_uptime_seconds"));
}

#[tokio::test]
async fn version_reports_package_info() {
    let app = setup_app().await;
    let response = app
        .oneshot(Request::builder().uri("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["name"], "bankwacht");
    assert!(json.get("version").is_some());
    assert!(json.get("build").is_some());
}

#[tokio::test]
async fn security_headers_are_present() {
    let app = setup_app().await;
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert!(headers.contains_key("x-content-type-options"));
    assert!(headers.contains_key("x-frame-options"));
    assert!(headers.contains_key("referrer-policy"));
    assert!(headers.contains_key("permissions-policy"));
    assert!(headers.contains_key("cross-origin-opener-policy"));
    assert!(headers.contains_key("cross-origin-resource-policy"));
}
