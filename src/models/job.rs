use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::models::studio::OutputFormat;

/// Identifier of a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Processing mode selected in the studio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum JobMode {
    Enhance,
    #[serde(alias = "tools")]
    #[strum(to_string = "edit", serialize = "tools")]
    Edit,
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobState {
    Idle,
    Running,
    Completed,
}

/// A named phase of a job, reached once progress hits `threshold`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub threshold: u8,
    pub label: String,
}

impl Checkpoint {
    pub fn new(threshold: u8, label: impl Into<String>) -> Self {
        Self {
            threshold,
            label: label.into(),
        }
    }
}

impl<S: Into<String>> From<(u8, S)> for Checkpoint {
    fn from((threshold, label): (u8, S)) -> Self {
        Self::new(threshold, label)
    }
}

/// Opaque reference to the output of a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultHandle(pub String);

impl ResultHandle {
    /// Storage key for a job's output, e.g. `results/<id>.mp4`.
    pub fn for_job(id: JobId, format: Option<OutputFormat>) -> Self {
        match format {
            Some(format) => Self(format!("results/{}.{}", id, format.extension())),
            None => Self(format!("results/{}", id)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything needed to start a job.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub mode: JobMode,
    pub checkpoints: Vec<Checkpoint>,
    pub output: Option<OutputFormat>,
}

impl JobSpec {
    pub fn new(mode: JobMode, checkpoints: impl IntoIterator<Item = Checkpoint>) -> Self {
        Self {
            mode,
            checkpoints: checkpoints.into_iter().collect(),
            output: None,
        }
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = Some(output);
        self
    }
}

/// Point-in-time view of a job, as returned by `observe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub mode: JobMode,
    pub progress: u8,
    pub status: String,
    pub state: JobState,
    pub result: Option<ResultHandle>,
    pub checkpoints_reached: usize,
    pub checkpoints_total: usize,
    pub updated_at: DateTime<Utc>,
}

impl JobSnapshot {
    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    /// Move a running snapshot to `Idle`. Returns false if it was already terminal.
    pub fn mark_cancelled(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = JobState::Idle;
        self.status = CANCELLED_STATUS.to_string();
        self.updated_at = Utc::now();
        true
    }
}

/// Status shown before the first checkpoint fires.
pub const SUBMITTED_STATUS: &str = "Starting...";

/// Status shown once a job reaches 100%.
pub const COMPLETED_STATUS: &str = "Processing Complete!";

/// Status shown after a running job is cancelled or superseded.
pub const CANCELLED_STATUS: &str = "Cancelled";
