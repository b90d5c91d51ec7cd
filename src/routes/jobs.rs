use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::models::job::{JobId, JobSnapshot};
use crate::models::studio::{ProcessRequest, SubmitResponse};

/// POST /api/v1/jobs: start processing a video, replacing any running job.
pub async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let handle = state.studio.start(&request).await?;
    let snapshot = handle.updates().borrow().clone();

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            job_id: handle.id(),
            state: snapshot.state,
            status: snapshot.status,
            message: format!("Processing {} with {} mode", request.file_name, request.mode),
        }),
    ))
}

/// GET /api/v1/jobs/current: snapshot of the most recent job.
pub async fn current_job(State(state): State<AppState>) -> ApiResult<Json<JobSnapshot>> {
    state
        .studio
        .current()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No job has been submitted".to_string()))
}

/// GET /api/v1/jobs/{job_id}: snapshot of a job.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobSnapshot>> {
    let id = parse_job_id(&job_id)?;
    Ok(Json(state.studio.status(id).await?))
}

/// DELETE /api/v1/jobs/{job_id}: cancel a job. Finished jobs are left as they are.
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_job_id(&job_id)?;
    state.studio.cancel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    Uuid::parse_str(raw)
        .map(JobId)
        .map_err(|_| ApiError::BadRequest(format!("Invalid job id: {}", raw)))
}
