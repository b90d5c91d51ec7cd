//! Job progress controller.
//!
//! Owns at most one running job. Each job is driven by a ticker task that
//! pulls ticks from a [`Scheduler`] and publishes a fresh [`JobSnapshot`]
//! through a `watch` channel after every tick, so readers always see a whole
//! snapshot and never wait on the ticker.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{BoxStream, StreamExt};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::job::{Checkpoint, JobId, JobMode, JobSnapshot, JobSpec};
use crate::services::checkpoints::CheckpointScript;
use crate::services::progress::{JobProgress, TickOutcome};
use crate::services::scheduler::Scheduler;

/// Number of finished jobs whose final snapshot stays observable.
pub const DEFAULT_HISTORY: usize = 64;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);
const DEFAULT_TICK_STEP: u8 = 1;

/// Tick cadence: how often a job advances and by how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickConfig {
    interval: Duration,
    step: u8,
}

impl TickConfig {
    pub fn new(interval: Duration, step: u8) -> Result<Self, ControllerError> {
        if interval.is_zero() {
            return Err(ControllerError::InvalidConfiguration(
                "tick interval must be positive".to_string(),
            ));
        }
        if step == 0 {
            return Err(ControllerError::InvalidConfiguration(
                "tick step must be positive".to_string(),
            ));
        }
        Ok(Self { interval, step })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn step(&self) -> u8 {
        self.step
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_TICK_INTERVAL,
            step: DEFAULT_TICK_STEP,
        }
    }
}

/// Returned by `submit`; observes one job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    id: JobId,
    updates: watch::Receiver<JobSnapshot>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Receiver notified on every published snapshot.
    pub fn updates(&self) -> watch::Receiver<JobSnapshot> {
        self.updates.clone()
    }

    /// Wait until the job is no longer running and return its final snapshot.
    pub async fn settled(&self) -> JobSnapshot {
        let mut rx = self.updates.clone();
        if rx.wait_for(|snapshot| !snapshot.is_running()).await.is_err() {
            tracing::debug!(job_id = %self.id, "Job publisher dropped while waiting");
        }
        let snapshot = rx.borrow().clone();
        snapshot
    }
}

/// Single-job progress controller.
pub struct ProgressController {
    tick: TickConfig,
    scheduler: Arc<dyn Scheduler>,
    inner: Mutex<ControllerState>,
}

struct ControllerState {
    active: Option<ActiveJob>,
    history: JobHistory,
}

struct ActiveJob {
    id: JobId,
    mode: JobMode,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    updates: Arc<watch::Sender<JobSnapshot>>,
}

impl ActiveJob {
    fn is_running(&self) -> bool {
        self.updates.borrow().is_running()
    }

    /// Stop the ticker, wait for it to exit, then mark the job `Idle` if it
    /// had not completed.
    async fn stop(&mut self) {
        self.cancel.cancel();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(job_id = %self.id, error = %e, "Job ticker ended abnormally");
            }
        }

        let cancelled = self
            .updates
            .send_if_modified(|snapshot| snapshot.mark_cancelled());

        if cancelled {
            let progress = self.updates.borrow().progress;
            tracing::info!(job_id = %self.id, mode = %self.mode, progress, "Job cancelled");
            metrics::counter!("studio_jobs_cancelled_total", "mode" => self.mode.to_string())
                .increment(1);
            metrics::gauge!("studio_active_jobs").set(0.0);
        }
    }
}

impl Drop for ActiveJob {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Bounded record of recent jobs, oldest evicted first.
struct JobHistory {
    capacity: usize,
    order: VecDeque<JobId>,
    jobs: HashMap<JobId, watch::Receiver<JobSnapshot>>,
}

impl JobHistory {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            jobs: HashMap::new(),
        }
    }

    fn insert(&mut self, id: JobId, updates: watch::Receiver<JobSnapshot>) {
        while self.order.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.jobs.remove(&evicted);
                tracing::debug!(job_id = %evicted, "Evicted job from history");
            }
        }
        self.order.push_back(id);
        self.jobs.insert(id, updates);
    }

    fn get(&self, id: JobId) -> Option<JobSnapshot> {
        self.jobs.get(&id).map(|rx| rx.borrow().clone())
    }
}

impl ProgressController {
    pub fn new(tick: TickConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_history(tick, scheduler, DEFAULT_HISTORY)
    }

    pub fn with_history(tick: TickConfig, scheduler: Arc<dyn Scheduler>, history: usize) -> Self {
        Self {
            tick,
            scheduler,
            inner: Mutex::new(ControllerState {
                active: None,
                history: JobHistory::new(history),
            }),
        }
    }

    pub fn tick_config(&self) -> TickConfig {
        self.tick
    }

    /// Start a job, cancelling any job still running.
    pub async fn submit(
        &self,
        mode: JobMode,
        checkpoints: impl IntoIterator<Item = Checkpoint>,
    ) -> Result<JobHandle, ControllerError> {
        self.submit_spec(JobSpec::new(mode, checkpoints)).await
    }

    /// Start a job from a full [`JobSpec`].
    ///
    /// The checkpoint list is validated before anything else happens, so an
    /// invalid submission leaves the running job untouched.
    pub async fn submit_spec(&self, spec: JobSpec) -> Result<JobHandle, ControllerError> {
        let script = CheckpointScript::new(spec.checkpoints)?;
        let checkpoint_count = script.len();

        let mut inner = self.inner.lock().await;

        if let Some(mut previous) = inner.active.take() {
            if previous.is_running() {
                tracing::info!(job_id = %previous.id, "Replacing running job");
            }
            previous.stop().await;
        }

        let id = JobId::new();
        let job = JobProgress::start(id, spec.mode, script, spec.output);
        let (tx, rx) = watch::channel(job.snapshot());
        let updates = Arc::new(tx);
        let cancel = CancellationToken::new();

        let ticks = self.scheduler.ticks(self.tick.interval);
        let task = tokio::spawn(drive(
            job,
            self.tick.step,
            ticks,
            cancel.clone(),
            Arc::clone(&updates),
        ));

        inner.history.insert(id, rx.clone());
        inner.active = Some(ActiveJob {
            id,
            mode: spec.mode,
            cancel,
            task: Some(task),
            updates,
        });

        metrics::counter!("studio_jobs_submitted_total", "mode" => spec.mode.to_string())
            .increment(1);
        metrics::gauge!("studio_active_jobs").set(1.0);

        tracing::info!(
            job_id = %id,
            mode = %spec.mode,
            checkpoints = checkpoint_count,
            interval_ms = self.tick.interval.as_millis() as u64,
            step = self.tick.step,
            "Job submitted"
        );

        Ok(JobHandle { id, updates: rx })
    }

    /// Current snapshot of the job behind `handle`. Never blocks.
    pub fn observe(&self, handle: &JobHandle) -> JobSnapshot {
        handle.updates.borrow().clone()
    }

    /// Snapshot of a job by id, if it is still in the history.
    pub async fn observe_id(&self, id: JobId) -> Result<JobSnapshot, ControllerError> {
        let inner = self.inner.lock().await;
        inner.history.get(id).ok_or(ControllerError::NoActiveJob(id))
    }

    /// Snapshot of the most recently submitted job.
    pub async fn current(&self) -> Option<JobSnapshot> {
        let inner = self.inner.lock().await;
        inner
            .active
            .as_ref()
            .map(|active| active.updates.borrow().clone())
    }

    pub async fn cancel(&self, handle: &JobHandle) -> Result<(), ControllerError> {
        self.cancel_id(handle.id).await
    }

    /// Stop a running job and move it to `Idle`.
    ///
    /// Cancelling a job that already finished or was superseded is a no-op.
    /// Unknown ids yield `NoActiveJob`.
    pub async fn cancel_id(&self, id: JobId) -> Result<(), ControllerError> {
        let mut inner = self.inner.lock().await;

        if let Some(active) = inner.active.as_mut().filter(|active| active.id == id) {
            if active.is_running() {
                active.stop().await;
            } else {
                tracing::debug!(job_id = %id, "Cancel ignored, job already finished");
            }
            return Ok(());
        }

        if inner.history.get(id).is_some() {
            tracing::debug!(job_id = %id, "Cancel ignored, job no longer active");
            return Ok(());
        }

        Err(ControllerError::NoActiveJob(id))
    }
}

/// Ticker task: advances `job` on every tick until it completes, the tick
/// source ends, or `cancel` fires.
async fn drive(
    mut job: JobProgress,
    step: u8,
    mut ticks: BoxStream<'static, ()>,
    cancel: CancellationToken,
    updates: Arc<watch::Sender<JobSnapshot>>,
) {
    let id = job.id();
    let mode = job.mode();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(job_id = %id, progress = job.progress(), "Job ticker stopped");
                return;
            }
            tick = ticks.next() => {
                if tick.is_none() {
                    tracing::warn!(job_id = %id, progress = job.progress(), "Tick source ended before job completed");
                    return;
                }

                let outcome = job.advance(step);
                updates.send_replace(job.snapshot());

                match outcome {
                    TickOutcome::Advanced => {
                        tracing::trace!(job_id = %id, progress = job.progress(), "Job advanced");
                    }
                    TickOutcome::Checkpoint { label } => {
                        tracing::info!(job_id = %id, progress = job.progress(), status = %label, "Job reached checkpoint");
                    }
                    TickOutcome::Completed => {
                        tracing::info!(job_id = %id, mode = %mode, "Job completed");
                        metrics::counter!("studio_jobs_completed_total", "mode" => mode.to_string())
                            .increment(1);
                        metrics::gauge!("studio_active_jobs").set(0.0);
                        return;
                    }
                    TickOutcome::Ignored => return,
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No active job with id {0}")]
    NoActiveJob(JobId),
}
