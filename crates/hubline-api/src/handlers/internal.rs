//! Collaborator routes: notifications, group cache control, chat injection.
//!
//! Mounted under `/internal` behind the bearer-token guard.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;

use hubline_core::error::AppError;
use hubline_core::types::GroupId;
use hubline_realtime::ChatMessage;
use hubline_realtime::message::validator;

use crate::dto::request::NotifyRequest;
use crate::dto::response::{AcceptedResponse, ApiResponse};
use crate::error::ApiError;
use crate::state::AppState;

type Accepted = (StatusCode, Json<ApiResponse<AcceptedResponse>>);

fn accepted() -> Accepted {
    (
        StatusCode::ACCEPTED,
        Json(ApiResponse::ok(AcceptedResponse::default())),
    )
}

fn valid_group(group_id: GroupId) -> Result<GroupId, ApiError> {
    if !group_id.is_valid() {
        return Err(AppError::validation("Group id must be positive").into());
    }
    Ok(group_id)
}

/// POST /internal/notifications
pub async fn push_notification(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Accepted, ApiError> {
    if !req.recipient_id.is_valid() {
        return Err(AppError::validation("recipient_id must be positive").into());
    }

    state
        .realtime
        .notifications
        .dispatch_to_user(&req.notification, req.recipient_id)
        .await?;

    Ok(accepted())
}

/// POST /internal/groups/{id}/cache/invalidate
pub async fn invalidate_group_cache(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> Result<StatusCode, ApiError> {
    let group_id = valid_group(group_id)?;
    state.realtime.hub.invalidate_group_cache(group_id);
    info!(group_id = %group_id, "Group member cache invalidated by request");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /internal/groups/{id}/cache/warm
pub async fn warm_group_cache(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> Result<StatusCode, ApiError> {
    let group_id = valid_group(group_id)?;
    state.realtime.hub.warm_group_cache(group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /internal/messages
///
/// Routes a chat message on behalf of `from`, exactly as if it had arrived
/// on that user's socket.
pub async fn dispatch_message(
    State(state): State<AppState>,
    Json(msg): Json<ChatMessage>,
) -> Result<Accepted, ApiError> {
    let from = msg
        .from
        .filter(|id| id.is_valid())
        .ok_or_else(|| AppError::validation("from must be a positive user id"))?;
    validator::validate_message(&msg)?;

    state.realtime.hub.dispatch(msg.normalize(from)).await?;
    Ok(accepted())
}
