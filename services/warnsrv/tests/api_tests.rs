//! HTTP-level tests for the REST interface

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{seed_car_with_bucket_rule, test_state};
use tower::util::ServiceExt;
use warnsrv::api;

const WINDOW: &str = "from=2020-01-01T00:00:00Z&to=2099-01-01T00:00:00Z";

#[tokio::test]
async fn test_health_check() {
    let state = test_state().await;
    let app = api::create_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_report_then_query_round_trip() {
    let state = test_state().await;
    seed_car_with_bucket_rule(&state).await;
    let app = api::create_router(state);

    let body = serde_json::json!([
        {"carId": 7, "signal": "{\"Mx\":12.0,\"Mi\":0.6}"}
    ])
    .to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/signals")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let items: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(items[0]["carId"], 7);
    assert_eq!(items[0]["signal"]["processed"], true);
    assert!(items[0].get("error").is_none());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/warnings?carId=7&{}", WINDOW))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let warnings: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(warnings.as_array().unwrap().len(), 1);
    assert_eq!(warnings[0]["warnLevel"], 0);
    assert_eq!(warnings[0]["batteryTypeCode"], "NCM");
    assert_eq!(warnings[0]["ruleName"], "voltage spread");

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/signals?carId=7&{}", WINDOW))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let signals: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(signals.as_array().unwrap().len(), 1);
    assert_eq!(signals[0]["processed"], true);
}

#[tokio::test]
async fn test_batch_reports_per_item_errors() {
    let state = test_state().await;
    seed_car_with_bucket_rule(&state).await;
    let app = api::create_router(state);

    let body = serde_json::json!([
        {"carId": 99, "signal": "{\"Mx\":12.0,\"Mi\":0.6}"},
        {"carId": 7, "signal": "{\"Mx\":12.0,\"Mi\":0.6}"}
    ])
    .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/signals")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let items: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(items[0]["error"].as_str().unwrap().contains("not found"));
    assert!(items[1].get("error").is_none());
}
