use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use video_studio::{
    config::AppConfig,
    models::{job::JobMode, studio::ProcessRequest},
    services::{controller::ProgressController, scheduler::IntervalScheduler, studio::Studio},
};

const DEFAULT_FILE: &str = "sample.mp4";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env()?;
    let tick = config.tick_config()?;

    let mode: JobMode = match std::env::var("SIMULATE_MODE") {
        Ok(raw) => raw.parse()?,
        Err(_) => JobMode::Enhance,
    };
    let file = std::env::var("SIMULATE_FILE").unwrap_or_else(|_| DEFAULT_FILE.to_string());

    let studio = Studio::new(ProgressController::new(tick, Arc::new(IntervalScheduler)));
    let handle = studio.start(&ProcessRequest::new(file, mode)).await?;

    let mut updates = handle.updates();
    let mut last_status = updates.borrow().status.clone();
    tracing::info!(job_id = %handle.id(), status = %last_status, "Simulation started");

    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();

        if snapshot.status != last_status {
            tracing::info!(progress = snapshot.progress, status = %snapshot.status, "Status changed");
            last_status = snapshot.status.clone();
        }

        if !snapshot.is_running() {
            tracing::info!(
                state = %snapshot.state,
                result = snapshot.result.as_ref().map(|r| r.as_str()),
                "Simulation finished"
            );
            break;
        }
    }

    Ok(())
}
