// Common types and utilities for API handlers

use axum::{http::StatusCode, response::Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{HostError, OrchestratorError};
use crate::host::roster::RosterError;

// Helper type for API responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

pub fn error_response(status: StatusCode, message: String) -> (StatusCode, Json<ApiResponse<()>>) {
    (status, Json(ApiResponse::error(message)))
}

/// Map runtime errors onto HTTP status codes
pub fn host_error_response(err: HostError) -> (StatusCode, Json<ApiResponse<()>>) {
    let status = match &err {
        HostError::Cycle(OrchestratorError::Busy { .. }) => StatusCode::CONFLICT,
        HostError::Cycle(_) => StatusCode::INTERNAL_SERVER_ERROR,
        HostError::Roster(RosterError::NotOnline(_)) => StatusCode::NOT_FOUND,
        HostError::Roster(RosterError::AlreadyOnline(_)) => StatusCode::CONFLICT,
        HostError::UnknownWorld(_) => StatusCode::NOT_FOUND,
        HostError::NotNight { .. } => StatusCode::CONFLICT,
        HostError::Stopped => StatusCode::SERVICE_UNAVAILABLE,
    };
    error_response(status, err.to_string())
}
