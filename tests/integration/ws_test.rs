//! Integration tests for WebSocket connection and messaging.

mod helpers;

use std::time::Duration;

use http::StatusCode;
use serde_json::json;

use hubline_core::types::{GroupId, UserId};

use helpers::{recv_kind, send_json, send_text, try_recv_json};

#[tokio::test]
async fn test_ws_upgrade_without_session() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/ws", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let refused = app.connect_with_token("unknown-token").await;
    assert_eq!(refused.err(), Some(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn test_ws_upgrade_with_cookie() {
    let app = helpers::TestApp::new().await;
    app.sessions.insert("cookie-token", UserId(9));

    let ws = app.connect_with_cookie("cookie-token").await;
    assert!(ws.is_ok());
    app.wait_online(UserId(9)).await;
}

#[tokio::test]
async fn test_query_user_id_only_when_enabled() {
    let app = helpers::TestApp::new().await;
    let url = format!("ws://{}/ws?userId=4", app.addr);
    let refused = tokio_tungstenite::connect_async(url).await;
    assert!(refused.is_err());

    let mut config = helpers::test_config();
    config.session.allow_query_user_id = true;
    let app = helpers::TestApp::with_config(config).await;
    let url = format!("ws://{}/ws?userId=4", app.addr);
    let (_ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    app.wait_online(UserId(4)).await;
}

#[tokio::test]
async fn test_private_message_end_to_end() {
    let app = helpers::TestApp::new().await;
    app.membership.allow_chat(UserId(1), UserId(2));

    let mut alice = app.connect_as(UserId(1)).await;
    let mut bob = app.connect_as(UserId(2)).await;

    send_json(
        &mut alice,
        json!({ "type": "private", "to": 2, "content": "hi" }),
    )
    .await;

    let got = recv_kind(&mut bob, "private").await;
    assert_eq!(got["from"], 1);
    assert_eq!(got["to"], 2);
    assert_eq!(got["content"], "hi");
    assert!(got["timestamp"].is_string());

    let echo = recv_kind(&mut alice, "private").await;
    assert_eq!(echo["content"], "hi");

    let saved = app.store.private_messages();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].from, UserId(1));
    assert_eq!(saved[0].to, UserId(2));
}

#[tokio::test]
async fn test_sender_cannot_spoof_from() {
    let app = helpers::TestApp::new().await;
    app.membership.allow_chat(UserId(1), UserId(2));

    let mut alice = app.connect_as(UserId(1)).await;
    let mut bob = app.connect_as(UserId(2)).await;

    send_json(
        &mut alice,
        json!({ "type": "private", "from": 77, "to": 2, "content": "it's me" }),
    )
    .await;

    let got = recv_kind(&mut bob, "private").await;
    assert_eq!(got["from"], 1);
}

#[tokio::test]
async fn test_missing_from_is_stamped_not_dropped() {
    let app = helpers::TestApp::new().await;
    app.membership.allow_chat(UserId(1), UserId(2));
    app.membership.set_group(GroupId(6), &[UserId(1), UserId(2)]);

    let mut alice = app.connect_as(UserId(1)).await;
    let mut bob = app.connect_as(UserId(2)).await;

    send_json(&mut alice, json!({ "type": "private", "to": 2, "content": "anon?" })).await;
    let got = recv_kind(&mut bob, "private").await;
    assert_eq!(got["from"], 1);

    send_json(&mut alice, json!({ "type": "group_message", "groupId": 6, "content": "hey" })).await;
    let got = recv_kind(&mut bob, "group_message").await;
    assert_eq!(got["from"], 1);
}

#[tokio::test]
async fn test_private_message_refused_without_relationship() {
    let app = helpers::TestApp::new().await;

    let mut alice = app.connect_as(UserId(1)).await;
    let mut carol = app.connect_as(UserId(3)).await;

    send_json(
        &mut alice,
        json!({ "type": "private", "to": 3, "content": "hello stranger" }),
    )
    .await;

    assert!(try_recv_json(&mut carol, Duration::from_millis(300)).await.is_none());
    assert!(app.store.private_messages().is_empty());
}

#[tokio::test]
async fn test_group_message_fan_out() {
    let app = helpers::TestApp::new().await;
    app.membership
        .set_group(GroupId(7), &[UserId(1), UserId(2), UserId(3)]);

    let mut bob = app.connect_as(UserId(2)).await;
    let mut carol = app.connect_as(UserId(3)).await;
    let mut alice = app.connect_as(UserId(1)).await;

    send_json(
        &mut alice,
        json!({ "type": "group_message", "groupId": 7, "content": "hello all" }),
    )
    .await;

    for (ws, member) in [(&mut bob, 2), (&mut carol, 3)] {
        let got = recv_kind(ws, "group_message").await;
        assert_eq!(got["groupId"], 7);
        assert_eq!(got["from"], 1);
        assert_eq!(got["to"], member);
        assert_eq!(got["content"], "hello all");
    }

    let echo = recv_kind(&mut alice, "group_message").await;
    assert_eq!(echo["to"], 1);
    assert_eq!(app.store.group_messages().len(), 1);
}

#[tokio::test]
async fn test_group_message_from_non_member_dropped() {
    let app = helpers::TestApp::new().await;
    app.membership.set_group(GroupId(7), &[UserId(2)]);

    let mut bob = app.connect_as(UserId(2)).await;
    let mut mallory = app.connect_as(UserId(6)).await;

    send_json(
        &mut mallory,
        json!({ "type": "group_message", "groupId": 7, "content": "spam" }),
    )
    .await;

    assert!(try_recv_json(&mut bob, Duration::from_millis(300)).await.is_none());
}

#[tokio::test]
async fn test_presence_announced_to_group_peers() {
    let app = helpers::TestApp::new().await;
    app.membership.set_group(GroupId(3), &[UserId(1), UserId(2)]);

    let mut bob = app.connect_as(UserId(2)).await;
    let _alice = app.connect_as(UserId(1)).await;

    let got = recv_kind(&mut bob, "user_online").await;
    assert_eq!(got["from"], 1);
    assert_eq!(got["groupId"], 3);
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    let app = helpers::TestApp::new().await;
    app.membership.allow_chat(UserId(1), UserId(2));

    let mut alice = app.connect_as(UserId(1)).await;
    let mut bob = app.connect_as(UserId(2)).await;

    send_text(&mut alice, "this is not json").await;
    send_json(&mut alice, json!({ "type": "private", "to": 2, "content": "" })).await;
    send_json(
        &mut alice,
        json!({ "type": "private", "to": 2, "content": "still here" }),
    )
    .await;

    let got = recv_kind(&mut bob, "private").await;
    assert_eq!(got["content"], "still here");
    assert!(app.state.realtime.metrics.snapshot().frames_rejected >= 2);
}

#[tokio::test]
async fn test_reconnect_replaces_connection() {
    let app = helpers::TestApp::new().await;

    let mut first = app.connect_as(UserId(5)).await;
    let _second = app.connect_as(UserId(5)).await;

    assert!(try_recv_json(&mut first, Duration::from_secs(2)).await.is_none());
    assert_eq!(
        app.state.realtime.hub.connected_users().await.unwrap(),
        vec![UserId(5)]
    );
    assert_eq!(app.state.realtime.metrics.snapshot().connections_replaced, 1);
}
