use garde::Validate;

use crate::models::job::{JobId, JobSnapshot, JobSpec};
use crate::models::studio::{ModeSettings, ProcessRequest};
use crate::services::checkpoints;
use crate::services::controller::{ControllerError, JobHandle, ProgressController};

/// Turns studio processing requests into controller jobs.
pub struct Studio {
    controller: ProgressController,
}

impl Studio {
    pub fn new(controller: ProgressController) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &ProgressController {
        &self.controller
    }

    /// Validate `request` and start processing it, replacing any running job.
    pub async fn start(&self, request: &ProcessRequest) -> Result<JobHandle, StudioError> {
        request.validate()?;

        match request.settings() {
            ModeSettings::Enhance(settings) => tracing::info!(
                file = %request.file_name,
                model = %settings.model,
                upscale_factor = settings.upscale_factor,
                output = %request.output_format,
                "Processing with enhance mode"
            ),
            ModeSettings::Edit(settings) => tracing::info!(
                file = %request.file_name,
                tool = %settings.tool,
                trim_start = settings.trim_start,
                trim_end = settings.trim_end,
                output = %request.output_format,
                "Processing with edit mode"
            ),
        }

        let spec = JobSpec::new(request.mode, checkpoints::studio_script(request))
            .with_output(request.output_format);

        Ok(self.controller.submit_spec(spec).await?)
    }

    pub async fn status(&self, id: JobId) -> Result<JobSnapshot, StudioError> {
        Ok(self.controller.observe_id(id).await?)
    }

    pub async fn current(&self) -> Option<JobSnapshot> {
        self.controller.current().await
    }

    pub async fn cancel(&self, id: JobId) -> Result<(), StudioError> {
        Ok(self.controller.cancel_id(id).await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error("Invalid request: {0}")]
    Validation(#[from] garde::Report),

    #[error(transparent)]
    Controller(#[from] ControllerError),
}
