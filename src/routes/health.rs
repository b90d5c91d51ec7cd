use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::models::job::{JobId, JobState};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_job: Option<JobId>,
    pub tick_interval_ms: u64,
    pub tick_step: u8,
}

/// GET /health: liveness plus the job currently running, if any.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let active_job = state
        .studio
        .current()
        .await
        .filter(|snapshot| snapshot.state == JobState::Running)
        .map(|snapshot| snapshot.job_id);
    let tick = state.studio.controller().tick_config();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_job,
        tick_interval_ms: tick.interval().as_millis() as u64,
        tick_step: tick.step(),
    })
}
