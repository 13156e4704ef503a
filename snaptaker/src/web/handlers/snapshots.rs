// Manual snapshot endpoint

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::common::{error_response, host_error_response, ApiResponse, ApiResult};
use crate::orchestrator::CycleReport;
use crate::web::AppState;

#[derive(Deserialize)]
pub struct SnapshotQuery {
    #[serde(default = "default_invoker")]
    pub invoker: String,
}

fn default_invoker() -> String {
    "api".to_string()
}

/// Run one snapshot cycle and wait for its report.
///
/// A busy orchestrator answers 409; a cycle that ran but failed answers
/// 502 with the message the invoker would have seen.
pub async fn create_snapshot(
    Query(query): Query<SnapshotQuery>,
    State(state): State<AppState>,
) -> ApiResult<CycleReport> {
    info!("Snapshot requested by {}", query.invoker);

    match state.host.snapshot(&query.invoker).await {
        Ok(report) if report.result.succeeded => Ok(Json(ApiResponse::success(report))),
        Ok(report) => {
            warn!(
                "Snapshot {} requested by {} failed: {}",
                report.result.label, query.invoker, report.message
            );
            Err(error_response(StatusCode::BAD_GATEWAY, report.message))
        }
        Err(e) => {
            error!("Snapshot request from {} rejected: {}", query.invoker, e);
            Err(host_error_response(e))
        }
    }
}
