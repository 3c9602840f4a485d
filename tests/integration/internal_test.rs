//! Integration tests for the `/internal` collaborator routes.

mod helpers;

use std::time::Duration;

use http::StatusCode;
use serde_json::json;

use hubline_core::types::{GroupId, UserId};

use helpers::{recv_kind, try_recv_json};

fn follow_request(sender: i64) -> serde_json::Value {
    json!({
        "id": 41,
        "sender_id": sender,
        "sender_nickname": "ada",
        "type": "follow_request",
        "message": "ada wants to follow you",
        "seen": false,
        "created_at": "2026-03-01T12:00:00Z",
    })
}

#[tokio::test]
async fn test_internal_requires_bearer_token() {
    let app = helpers::TestApp::new().await;
    let body = json!({ "recipient_id": 5, "notification": follow_request(1) });

    let response = app
        .request("POST", "/internal/notifications", Some(body.clone()), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("POST", "/internal/notifications", Some(body), Some("wrong"))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_internal_disabled_without_configured_token() {
    let mut config = helpers::test_config();
    config.server.internal_token = String::new();
    let app = helpers::TestApp::with_config(config).await;

    let response = app
        .request("POST", "/internal/groups/1/cache/invalidate", None, Some(""))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notification_pushed_to_online_user() {
    let app = helpers::TestApp::new().await;
    let mut ws = app.connect_as(UserId(5)).await;

    let response = app
        .internal(
            "/internal/notifications",
            Some(json!({ "recipient_id": 5, "notification": follow_request(1) })),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(response.body["data"]["status"], "accepted");

    let got = recv_kind(&mut ws, "follow_request").await;
    assert_eq!(got["recipient_id"], 5);
    assert_eq!(got["sender_id"], 1);
    assert_eq!(got["message"], "ada wants to follow you");
    app.state.realtime.hub.connected_users().await.unwrap();
    assert_eq!(
        app.state.realtime.metrics.snapshot().notifications_delivered,
        1
    );
}

#[tokio::test]
async fn test_notification_for_offline_user_is_skipped() {
    let app = helpers::TestApp::new().await;

    let response = app
        .internal(
            "/internal/notifications",
            Some(json!({ "recipient_id": 8, "notification": follow_request(1) })),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    // Skips are counted inside the hub loop; read after a round trip.
    app.state.realtime.hub.connected_users().await.unwrap();
    assert_eq!(app.state.realtime.metrics.snapshot().notifications_skipped, 1);
}

#[tokio::test]
async fn test_notification_rejects_invalid_recipient() {
    let app = helpers::TestApp::new().await;

    let response = app
        .internal(
            "/internal/notifications",
            Some(json!({ "recipient_id": 0, "notification": follow_request(1) })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_group_cache_invalidate_and_warm() {
    let app = helpers::TestApp::new().await;
    app.membership.set_group(GroupId(4), &[UserId(1), UserId(2)]);

    let response = app.internal("/internal/groups/4/cache/warm", None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let cached = app.state.realtime.groups.cached(GroupId(4)).unwrap();
    assert_eq!(&cached[..], &[UserId(1), UserId(2)]);

    app.membership
        .set_group(GroupId(4), &[UserId(1), UserId(2), UserId(3)]);
    let response = app
        .internal("/internal/groups/4/cache/invalidate", None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(app.state.realtime.groups.cached(GroupId(4)).is_none());

    let response = app.internal("/internal/groups/0/cache/warm", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalidated_group_sees_new_member() {
    let app = helpers::TestApp::new().await;
    app.membership.set_group(GroupId(4), &[UserId(1)]);
    app.state.realtime.hub.warm_group_cache(GroupId(4)).await.unwrap();

    app.membership.set_group(GroupId(4), &[UserId(1), UserId(2)]);
    let mut bob = app.connect_as(UserId(2)).await;

    app.internal("/internal/groups/4/cache/invalidate", None)
        .await;
    let response = app
        .internal(
            "/internal/messages",
            Some(json!({ "type": "group_message", "from": 1, "groupId": 4, "content": "welcome" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let got = recv_kind(&mut bob, "group_message").await;
    assert_eq!(got["content"], "welcome");
}

#[tokio::test]
async fn test_internal_message_routed_like_socket_message() {
    let app = helpers::TestApp::new().await;
    app.membership.allow_chat(UserId(1), UserId(2));
    let mut bob = app.connect_as(UserId(2)).await;

    let response = app
        .internal(
            "/internal/messages",
            Some(json!({ "type": "private", "from": 1, "to": 2, "content": "from the api" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let got = recv_kind(&mut bob, "private").await;
    assert_eq!(got["from"], 1);
    assert!(got["timestamp"].is_string());
}

#[tokio::test]
async fn test_internal_message_validation() {
    let app = helpers::TestApp::new().await;
    app.membership.allow_chat(UserId(1), UserId(2));
    let mut bob = app.connect_as(UserId(2)).await;

    let response = app
        .internal(
            "/internal/messages",
            Some(json!({ "type": "private", "to": 2, "content": "who am i" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .internal(
            "/internal/messages",
            Some(json!({ "type": "private", "from": 1, "to": 2, "content": "" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert!(try_recv_json(&mut bob, Duration::from_millis(300)).await.is_none());
}

#[tokio::test]
async fn test_internal_message_whitespace_content_is_delivered() {
    let app = helpers::TestApp::new().await;
    app.membership.allow_chat(UserId(1), UserId(2));
    let mut bob = app.connect_as(UserId(2)).await;

    let response = app
        .internal(
            "/internal/messages",
            Some(json!({ "type": "private", "from": 1, "to": 2, "content": "   " })),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let got = recv_kind(&mut bob, "private").await;
    assert_eq!(got["content"], "   ");
}
