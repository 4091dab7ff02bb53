//! Health endpoints and request ids.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use kedai_integration_tests::{TestClient, test_app};

#[tokio::test]
async fn test_liveness() {
    let mut client = TestClient::new(test_app());

    let response = client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
    assert!(response.header("x-request-id").is_some());
}

#[tokio::test]
async fn test_readiness_without_database() {
    let mut client = TestClient::new(test_app());

    let response = client.get("/health/ready").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let mut client = TestClient::new(test_app());

    let request = Request::get("/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();
    let response = client.send(request).await;
    assert_eq!(response.header("x-request-id"), Some("trace-me-123"));
}

#[tokio::test]
async fn test_database_errors_are_generic() {
    let mut client = TestClient::new(test_app());

    let response = client.get("/api/products").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "Internal server error");
}
