//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt, future};
use tracing::{info, warn};

use hubline_core::types::UserId;
use hubline_realtime::Frame;

use crate::extractors::SessionUser;
use crate::state::AppState;

/// GET /ws: authenticate, then hand the socket to the real-time engine.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    ws: WebSocketUpgrade,
) -> Response {
    let max_size = state.config.realtime.max_message_size;
    ws.max_message_size(max_size)
        .max_frame_size(max_size)
        .on_upgrade(move |socket| handle_socket(state, user_id, socket))
}

/// Handles an established WebSocket connection.
async fn handle_socket(state: AppState, user_id: UserId, socket: WebSocket) {
    info!(user_id = %user_id, "WebSocket connection established");

    let (sink, stream) = socket.split();
    let stream = stream.map(|result| result.map(frame_from_message));
    let sink = sink.with(|frame: Frame| future::ready(Ok::<_, axum::Error>(message_from_frame(frame))));

    if let Err(e) = state.realtime.serve_connection(user_id, stream, sink).await {
        warn!(user_id = %user_id, error = %e, "WebSocket connection rejected");
        return;
    }

    info!(user_id = %user_id, "WebSocket connection closed");
}

fn frame_from_message(msg: Message) -> Frame {
    match msg {
        Message::Text(text) => Frame::Text(text.as_str().to_owned()),
        Message::Binary(data) => Frame::Binary(data.to_vec()),
        Message::Ping(data) => Frame::Ping(data.to_vec()),
        Message::Pong(data) => Frame::Pong(data.to_vec()),
        Message::Close(_) => Frame::Close,
    }
}

fn message_from_frame(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Binary(data) => Message::Binary(data.into()),
        Frame::Ping(data) => Message::Ping(data.into()),
        Frame::Pong(data) => Message::Pong(data.into()),
        Frame::Close => Message::Close(None),
    }
}
