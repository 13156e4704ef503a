// Host status and message history endpoints

use axum::{extract::State, response::Json};

use super::common::{host_error_response, ApiResponse, ApiResult};
use crate::host::HostStatus;
use crate::services::{BroadcastEntry, DirectMessage};
use crate::web::AppState;

pub async fn get_status(State(state): State<AppState>) -> ApiResult<HostStatus> {
    state
        .host
        .status()
        .await
        .map(|status| Json(ApiResponse::success(status)))
        .map_err(host_error_response)
}

/// Most recent broadcasts, oldest first
pub async fn get_broadcasts(State(state): State<AppState>) -> ApiResult<Vec<BroadcastEntry>> {
    Ok(Json(ApiResponse::success(state.notifier.recent_broadcasts())))
}

pub async fn get_operator_commands(State(state): State<AppState>) -> ApiResult<Vec<BroadcastEntry>> {
    Ok(Json(ApiResponse::success(
        state.notifier.recent_operator_commands(),
    )))
}

/// Replies sent to snapshot invokers
pub async fn get_direct_messages(State(state): State<AppState>) -> ApiResult<Vec<DirectMessage>> {
    Ok(Json(ApiResponse::success(state.notifier.recent_direct_messages())))
}
