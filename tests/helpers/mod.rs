//! Test helper utilities for driving the HTTP API

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::{sleep, Instant};
use video_studio::{
    app_state::AppState,
    models::job::{JobId, JobSnapshot},
    routes,
    services::{
        controller::{ProgressController, TickConfig},
        scheduler::Scheduler,
        studio::Studio,
    },
};

/// Serve the API on an ephemeral port and return its base URL.
pub async fn spawn_server(tick: TickConfig, scheduler: Arc<dyn Scheduler>) -> String {
    let controller = ProgressController::new(tick, scheduler);
    let app = routes::router(AppState::new(Studio::new(controller)));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    format!("http://{}", addr)
}

/// Fetch a job snapshot, failing on any non-200 response.
pub async fn get_job(
    client: &reqwest::Client,
    base_url: &str,
    job_id: JobId,
) -> Result<JobSnapshot, Box<dyn std::error::Error>> {
    let response = client
        .get(format!("{}/api/v1/jobs/{}", base_url, job_id))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await?;
        return Err(format!("Status check failed with {}: {}", status, error_text).into());
    }

    Ok(response.json::<JobSnapshot>().await?)
}

/// Poll a job until `done` holds for its snapshot (with timeout)
pub async fn poll_job_until(
    client: &reqwest::Client,
    base_url: &str,
    job_id: JobId,
    timeout: Duration,
    done: impl Fn(&JobSnapshot) -> bool,
) -> Result<JobSnapshot, Box<dyn std::error::Error>> {
    let deadline = Instant::now() + timeout;
    let mut last_progress = 0;

    loop {
        let snapshot = get_job(client, base_url, job_id).await?;
        if snapshot.progress < last_progress {
            return Err(format!(
                "Progress went backwards: {} -> {}",
                last_progress, snapshot.progress
            )
            .into());
        }
        last_progress = snapshot.progress;

        if done(&snapshot) {
            return Ok(snapshot);
        }
        if Instant::now() >= deadline {
            return Err(format!("Job {} did not settle within {:?}", job_id, timeout).into());
        }
        sleep(Duration::from_millis(10)).await;
    }
}
