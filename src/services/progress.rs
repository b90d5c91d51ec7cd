use chrono::{DateTime, Utc};

use crate::models::job::{
    JobId, JobMode, JobSnapshot, JobState, ResultHandle, COMPLETED_STATUS, SUBMITTED_STATUS,
};
use crate::models::studio::OutputFormat;
use crate::services::checkpoints::CheckpointScript;

/// What a single tick did to a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Progress moved without reaching a new checkpoint.
    Advanced,
    /// Progress reached one or more checkpoints; `label` is the last one.
    Checkpoint { label: String },
    /// Progress reached 100.
    Completed,
    /// The job was not running; nothing changed.
    Ignored,
}

/// Mutable state of one running job, advanced by ticks.
///
/// Checkpoints fire on `progress >= threshold` so a step larger than 1
/// never skips one. Several checkpoints crossed by the same tick all count
/// as reached; the status shows the last of them.
#[derive(Debug, Clone)]
pub struct JobProgress {
    id: JobId,
    mode: JobMode,
    script: CheckpointScript,
    output: Option<OutputFormat>,
    cursor: usize,
    progress: u8,
    status: String,
    state: JobState,
    result: Option<ResultHandle>,
    updated_at: DateTime<Utc>,
}

impl JobProgress {
    /// A freshly submitted job: `Running` at 0%, with any threshold-0
    /// checkpoint already applied.
    pub fn start(
        id: JobId,
        mode: JobMode,
        script: CheckpointScript,
        output: Option<OutputFormat>,
    ) -> Self {
        let mut job = Self {
            id,
            mode,
            script,
            output,
            cursor: 0,
            progress: 0,
            status: SUBMITTED_STATUS.to_string(),
            state: JobState::Running,
            result: None,
            updated_at: Utc::now(),
        };
        job.fire_checkpoints();
        job
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn mode(&self) -> JobMode {
        self.mode
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Apply one tick of `step` percent.
    pub fn advance(&mut self, step: u8) -> TickOutcome {
        if self.state != JobState::Running {
            return TickOutcome::Ignored;
        }

        self.progress = self.progress.saturating_add(step).min(100);
        self.updated_at = Utc::now();

        if self.progress >= 100 {
            self.cursor = self.script.len();
            self.state = JobState::Completed;
            self.status = COMPLETED_STATUS.to_string();
            self.result = Some(ResultHandle::for_job(self.id, self.output));
            return TickOutcome::Completed;
        }

        match self.fire_checkpoints() {
            Some(label) => TickOutcome::Checkpoint { label },
            None => TickOutcome::Advanced,
        }
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.id,
            mode: self.mode,
            progress: self.progress,
            status: self.status.clone(),
            state: self.state,
            result: self.result.clone(),
            checkpoints_reached: self.cursor,
            checkpoints_total: self.script.len(),
            updated_at: self.updated_at,
        }
    }

    /// Advance the cursor past every checkpoint at or below the current
    /// progress. Returns the label of the last one fired.
    fn fire_checkpoints(&mut self) -> Option<String> {
        let mut fired = None;
        while let Some(checkpoint) = self.script.get(self.cursor) {
            if self.progress < checkpoint.threshold {
                break;
            }
            fired = Some(checkpoint.label.clone());
            self.cursor += 1;
        }
        if let Some(label) = &fired {
            self.status = label.clone();
        }
        fired
    }
}
