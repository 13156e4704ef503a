// Participant endpoints: drive the host's roster the way real clients would

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::common::{host_error_response, ApiResponse, ApiResult};
use crate::host::roster::{Participant, Position};
use crate::web::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct JoinRequest {
    /// Defaults to the primary world
    #[serde(default)]
    pub world: Option<String>,
    #[serde(default)]
    pub position: Position,
}

pub async fn join_participant(
    Path(name): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<JoinRequest>,
) -> ApiResult<Participant> {
    info!("Join requested for {}", name);
    state
        .host
        .join(&name, request.world, request.position)
        .await
        .map(|participant| Json(ApiResponse::success(participant)))
        .map_err(host_error_response)
}

/// Leaving records the departure used by the post-backup operator notice
pub async fn leave_participant(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Value> {
    state
        .host
        .leave(&name)
        .await
        .map_err(host_error_response)?;

    Ok(Json(ApiResponse::success(json!({
        "name": name,
        "status": "left"
    }))))
}

pub async fn sleep_participant(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Value> {
    state
        .host
        .sleep(&name)
        .await
        .map_err(host_error_response)?;

    Ok(Json(ApiResponse::success(json!({
        "name": name,
        "status": "sleeping"
    }))))
}

pub async fn wake_participant(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Value> {
    state
        .host
        .wake(&name)
        .await
        .map_err(host_error_response)?;

    Ok(Json(ApiResponse::success(json!({
        "name": name,
        "status": "awake"
    }))))
}

/// Position diagnostic: the participant says where they are in chat
pub async fn announce_position(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<String> {
    state
        .host
        .position(&name)
        .await
        .map(|text| Json(ApiResponse::success(text)))
        .map_err(host_error_response)
}

pub async fn update_position(
    Path(name): Path<String>,
    State(state): State<AppState>,
    Json(position): Json<Position>,
) -> ApiResult<Participant> {
    state
        .host
        .set_position(&name, position)
        .await
        .map(|participant| Json(ApiResponse::success(participant)))
        .map_err(host_error_response)
}
