//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use futures::{SinkExt, StreamExt};
use http::{Request, StatusCode};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use hubline_api::AppState;
use hubline_core::config::AppConfig;
use hubline_core::types::UserId;
use hubline_realtime::RealtimeEngine;
use hubline_realtime::mock::{MockMembership, MockSessions, MockStore};

/// Bearer token the test app expects on `/internal` routes.
pub const INTERNAL_TOKEN: &str = "test-internal-token";

/// Client side of a test WebSocket.
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Address of the live server, for WebSocket clients
    pub addr: SocketAddr,
    /// Shared state behind both
    pub state: AppState,
    /// Group membership and follow graph
    pub membership: Arc<MockMembership>,
    /// Records persisted chat messages
    pub store: Arc<MockStore>,
    /// Session tokens
    pub sessions: Arc<MockSessions>,
}

/// Configuration used by default in tests.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.internal_token = INTERNAL_TOKEN.to_string();
    config.logging.level = "warn".to_string();
    config
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application with a custom configuration
    pub async fn with_config(config: AppConfig) -> Self {
        let membership = Arc::new(MockMembership::new());
        let store = Arc::new(MockStore::new());
        let sessions = Arc::new(MockSessions::new());

        let engine =
            RealtimeEngine::start(config.realtime.clone(), membership.clone(), store.clone());
        let state = AppState::new(Arc::new(config), engine, sessions.clone(), None);
        let router = hubline_api::build_app(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let app = router.clone();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            router,
            addr,
            state,
            membership,
            store,
            sessions,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// POST to an internal route with the configured bearer token
    pub async fn internal(&self, path: &str, body: Option<Value>) -> TestResponse {
        self.request("POST", path, body, Some(INTERNAL_TOKEN)).await
    }

    /// Open a WebSocket with a `token` query parameter
    pub async fn connect_with_token(&self, token: &str) -> Result<WsClient, StatusCode> {
        let url = format!("ws://{}/ws?token={}", self.addr, token);
        Self::open(url.into_client_request().expect("Invalid ws url")).await
    }

    /// Open a WebSocket with the session cookie
    pub async fn connect_with_cookie(&self, token: &str) -> Result<WsClient, StatusCode> {
        let mut req = format!("ws://{}/ws", self.addr)
            .into_client_request()
            .expect("Invalid ws url");
        let cookie = format!("{}={}", self.state.config.session.cookie_name, token);
        req.headers_mut()
            .insert("Cookie", cookie.parse().expect("Invalid cookie header"));
        Self::open(req).await
    }

    /// Give `user_id` a session, connect, and wait until the hub has them
    pub async fn connect_as(&self, user_id: UserId) -> WsClient {
        let token = format!("session-{}", user_id.0);
        self.sessions.insert(token.clone(), user_id);
        let ws = self
            .connect_with_token(&token)
            .await
            .expect("WebSocket upgrade refused");
        self.wait_online(user_id).await;
        ws
    }

    /// Wait until the hub reports `user_id` online
    pub async fn wait_online(&self, user_id: UserId) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !self
                .state
                .realtime
                .hub
                .is_online(user_id)
                .await
                .expect("Hub stopped")
            {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("User never came online");
    }

    async fn open(
        req: tokio_tungstenite::tungstenite::handshake::client::Request,
    ) -> Result<WsClient, StatusCode> {
        match connect_async(req).await {
            Ok((ws, _)) => Ok(ws),
            Err(tokio_tungstenite::tungstenite::Error::Http(response)) => Err(response.status()),
            Err(e) => panic!("WebSocket connect failed: {e}"),
        }
    }
}

/// Send a JSON text frame
pub async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Send raw text
pub async fn send_text(ws: &mut WsClient, text: &str) {
    ws.send(Message::Text(text.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Next JSON text frame, within `wait`
pub async fn try_recv_json(ws: &mut WsClient, wait: Duration) -> Option<Value> {
    tokio::time::timeout(wait, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Some(
                        serde_json::from_str::<Value>(text.as_str()).expect("Invalid JSON frame"),
                    );
                }
                Some(Ok(Message::Close(_))) | None => return None,
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("WebSocket error: {e}"),
            }
        }
    })
    .await
    .ok()
    .flatten()
}

/// Next JSON text frame whose `type` is `kind`, skipping others
pub async fn recv_kind(ws: &mut WsClient, kind: &str) -> Value {
    loop {
        let value = try_recv_json(ws, Duration::from_secs(5))
            .await
            .unwrap_or_else(|| panic!("No {kind} frame received"));
        if value["type"] == kind {
            return value;
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
