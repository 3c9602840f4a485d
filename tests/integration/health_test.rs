//! Integration tests for the health endpoints.

mod helpers;

use http::StatusCode;

use hubline_core::types::UserId;

#[tokio::test]
async fn test_health_check() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["status"], "ok");
    assert!(response.body["data"]["version"].is_string());
}

#[tokio::test]
async fn test_detailed_health_check() {
    let app = helpers::TestApp::new().await;
    let _ws = app.connect_as(UserId(3)).await;

    let response = app.request("GET", "/api/health/detailed", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["status"], "ok");
    assert_eq!(data["database"], "disabled");
    assert_eq!(data["hub_running"], true);
    assert_eq!(data["online_users"], serde_json::json!([3]));
    assert_eq!(data["metrics"]["connections_active"], 1);
}

#[tokio::test]
async fn test_detailed_health_after_hub_shutdown() {
    let app = helpers::TestApp::new().await;
    app.state.realtime.shutdown().await.unwrap();

    let response = app.request("GET", "/api/health/detailed", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "degraded");
    assert_eq!(response.body["data"]["hub_running"], false);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/nope", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
