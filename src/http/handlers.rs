//! Inbound endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::http::server::AppState;
use crate::workflow::WorkflowRequest;

/// `POST /api/submissions` — acknowledge immediately, run the saga on a
/// detached task. The eventual WorkflowResult is pushed via the notifier.
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<WorkflowRequest>,
) -> impl IntoResponse {
    let submission_id = request.submission_id.clone();
    tracing::info!(
        submission_id = %submission_id,
        user_id = %request.user_id,
        "submission accepted for processing"
    );

    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        orchestrator.run(request).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "submission accepted for processing",
            "submissionId": submission_id,
            "status": "processing",
        })),
    )
}

/// `POST /api/submissions/{submission_id}/retry` — run the saga to
/// completion and return the full WorkflowResult inline.
pub async fn retry(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
    Json(request): Json<WorkflowRequest>,
) -> Response {
    if request.submission_id != submission_id {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "submissionId in path and body do not match",
            })),
        )
            .into_response();
    }

    let result = state.orchestrator.run(request).await;
    Json(result).into_response()
}

/// `GET /health` — liveness plus per-dependency breaker state.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "circuitBreakers": state.breakers.snapshot(),
    }))
}
