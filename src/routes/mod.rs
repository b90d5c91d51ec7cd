pub mod health;
pub mod jobs;
pub mod metrics;

use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Request bodies are small JSON documents.
const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// API routes with the shared middleware stack. `/metrics` is mounted by
/// the server binary, which owns the Prometheus recorder.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/jobs", axum::routing::post(jobs::submit_job))
        .route("/api/v1/jobs/current", get(jobs::current_job))
        .route(
            "/api/v1/jobs/{job_id}",
            get(jobs::get_job).delete(jobs::cancel_job),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
}
