use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use video_studio::{
    app_state::AppState,
    config::AppConfig,
    routes,
    services::{controller::ProgressController, scheduler::IntervalScheduler, studio::Studio},
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");
    let tick = config.tick_config().expect("Invalid tick configuration");

    tracing::info!("Initializing video-studio server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!(
        "studio_jobs_submitted_total",
        "Total processing jobs submitted"
    );
    metrics::describe_counter!(
        "studio_jobs_completed_total",
        "Total processing jobs that reached 100%"
    );
    metrics::describe_counter!(
        "studio_jobs_cancelled_total",
        "Total processing jobs cancelled or superseded while running"
    );
    metrics::describe_gauge!("studio_active_jobs", "Whether a job is currently running");

    tracing::info!(
        interval_ms = tick.interval().as_millis() as u64,
        step = tick.step(),
        history = config.job_history,
        "Starting progress controller"
    );
    let controller =
        ProgressController::with_history(tick, Arc::new(IntervalScheduler), config.job_history);
    let state = AppState::new(Studio::new(controller));

    let app = routes::router(state).route(
        "/metrics",
        get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
    );

    tracing::info!("Starting video-studio on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
