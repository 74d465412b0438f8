use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{CandidateId, StageMoveRequest};
use super::repository::CandidateRepository;
use super::service::{PipelineService, PipelineServiceError};

/// Router builder exposing the pipeline listing and move endpoints.
pub fn pipeline_router<R>(service: Arc<PipelineService<R>>) -> Router
where
    R: CandidateRepository + 'static,
{
    Router::new()
        .route("/api/v1/pipeline", get(pipeline_handler::<R>))
        .route("/api/v1/pipeline/:candidate_id", put(move_handler::<R>))
        .with_state(service)
}

pub(crate) async fn pipeline_handler<R>(State(service): State<Arc<PipelineService<R>>>) -> Response
where
    R: CandidateRepository + 'static,
{
    match service.snapshot() {
        Ok(snapshot) => {
            let payload = json!({
                "success": true,
                "pipeline": snapshot.pipeline,
                "stats": snapshot.stats,
                "candidates": snapshot.candidates,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            error!(error = %err, "failed to build pipeline listing");
            failure(&err, "Failed to fetch candidate pipeline data")
        }
    }
}

pub(crate) async fn move_handler<R>(
    State(service): State<Arc<PipelineService<R>>>,
    Path(candidate_id): Path<String>,
    body: Result<Json<StageMoveRequest>, JsonRejection>,
) -> Response
where
    R: CandidateRepository + 'static,
{
    // A body without a usable `stage` string names no stage at all.
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let payload = json!({
                "success": false,
                "message": format!("invalid stage in request body: {}", rejection.body_text()),
            });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    // Ids that are not numeric cannot name a stored candidate.
    let Ok(id) = candidate_id.parse::<CandidateId>() else {
        let payload = json!({
            "success": false,
            "message": format!("candidate {candidate_id} not found"),
        });
        return (StatusCode::NOT_FOUND, Json(payload)).into_response();
    };

    match service.move_candidate(id, &request) {
        Ok(change) => {
            let payload = json!({
                "success": true,
                "message": format!("Candidate {} moved to {}", change.candidate_id, change.new_stage),
                "candidateId": change.candidate_id,
                "previousStage": change.previous_stage,
                "newStage": change.new_stage,
                "changed": change.changed,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => failure(&err, "Failed to update candidate stage"),
    }
}

fn failure(err: &PipelineServiceError, unavailable_message: &str) -> Response {
    let (status, message) = match err {
        PipelineServiceError::InvalidStage(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        PipelineServiceError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        PipelineServiceError::StaleStage { .. } => (StatusCode::CONFLICT, err.to_string()),
        PipelineServiceError::TransitionNotAllowed { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        PipelineServiceError::DataUnavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("{unavailable_message}: {err}"),
        ),
    };

    let payload = json!({
        "success": false,
        "message": message,
    });
    (status, Json(payload)).into_response()
}
