use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;
use trendscout_trends::CoordinatorStatus;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct RunStarted {
    started: bool,
}

/// Kick off a pipeline run in the background. Never waits for the run.
pub(super) async fn trigger_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<(StatusCode, Json<ApiResponse<RunStarted>>), ApiError> {
    if !state.coordinator.spawn_run() {
        return Err(ApiError::new(
            req_id.0,
            "conflict",
            "a pipeline run is already in progress",
        ));
    }

    tracing::info!(request_id = %req_id.0, "run triggered via api");
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: RunStarted { started: true },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn run_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<CoordinatorStatus>> {
    Json(ApiResponse {
        data: state.coordinator.status(),
        meta: ResponseMeta::new(req_id.0),
    })
}
