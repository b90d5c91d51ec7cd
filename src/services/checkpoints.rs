//! Checkpoint scripts: validation and the studio's built-in phase labels.

use crate::models::job::{Checkpoint, JobMode};
use crate::models::studio::{EditTool, ModeSettings, ProcessRequest};
use crate::services::controller::ControllerError;

/// Thresholds shared by both built-in scripts.
const STUDIO_THRESHOLDS: [u8; 4] = [0, 25, 50, 75];

const ENHANCE_LABELS: [&str; 4] = [
    "Analyzing Video Frames...",
    "Applying Topaz AI Model...",
    "Upscaling Resolution...",
    "Encoding Output...",
];

const EDIT_LABELS: [&str; 4] = [
    "Parsing Video...",
    "Applying Edit Operations...",
    "Rendering with FFMPEG...",
    "Finalizing...",
];

/// An ordered, validated list of checkpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointScript {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointScript {
    /// Validate `checkpoints`: thresholds strictly increasing and below 100,
    /// labels non-empty.
    pub fn new(checkpoints: Vec<Checkpoint>) -> Result<Self, ControllerError> {
        let mut previous: Option<u8> = None;

        for checkpoint in &checkpoints {
            if checkpoint.threshold >= 100 {
                return Err(ControllerError::InvalidConfiguration(format!(
                    "checkpoint threshold {} is outside [0, 100)",
                    checkpoint.threshold
                )));
            }
            if let Some(prev) = previous {
                if checkpoint.threshold <= prev {
                    return Err(ControllerError::InvalidConfiguration(format!(
                        "checkpoint thresholds must be strictly increasing ({} after {})",
                        checkpoint.threshold, prev
                    )));
                }
            }
            if checkpoint.label.trim().is_empty() {
                return Err(ControllerError::InvalidConfiguration(format!(
                    "checkpoint at {} has an empty label",
                    checkpoint.threshold
                )));
            }
            previous = Some(checkpoint.threshold);
        }

        Ok(Self { checkpoints })
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Checkpoint> {
        self.checkpoints.get(index)
    }
}

/// The default script for a mode.
pub fn default_script(mode: JobMode) -> Vec<Checkpoint> {
    let labels = match mode {
        JobMode::Enhance => ENHANCE_LABELS,
        JobMode::Edit => EDIT_LABELS,
    };

    STUDIO_THRESHOLDS
        .iter()
        .zip(labels)
        .map(|(threshold, label)| Checkpoint::new(*threshold, label))
        .collect()
}

/// The default script with labels specialized to the request's settings.
pub fn studio_script(request: &ProcessRequest) -> Vec<Checkpoint> {
    let mut script = default_script(request.mode);

    match request.settings() {
        ModeSettings::Enhance(settings) => {
            script[1].label = format!("Applying {} Model...", settings.model.label());
            script[2].label = format!(
                "Upscaling Resolution (x{})...",
                settings.upscale_factor
            );
        }
        ModeSettings::Edit(settings) => {
            script[1].label = match settings.tool {
                EditTool::Compress => "Applying Compression...".to_string(),
                EditTool::Trim => format!(
                    "Trimming {}s to {}s...",
                    settings.trim_start, settings.trim_end
                ),
                EditTool::Split => "Splitting Video...".to_string(),
            };
        }
    }

    script[3].label = format!(
        "{} ({})",
        script[3].label.trim_end_matches("..."),
        request.output_format
    );
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::studio::{EditSettings, EnhanceSettings, AiModel, OutputFormat};

    fn script(pairs: &[(u8, &str)]) -> Result<CheckpointScript, ControllerError> {
        CheckpointScript::new(pairs.iter().map(|(t, l)| Checkpoint::new(*t, *l)).collect())
    }

    #[test]
    fn test_valid_script() {
        let script = script(&[(0, "a"), (25, "b"), (99, "c")]).unwrap();
        assert_eq!(script.len(), 3);
        assert_eq!(script.get(2).unwrap().threshold, 99);
    }

    #[test]
    fn test_empty_script_is_valid() {
        assert!(script(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unordered_thresholds() {
        assert!(matches!(
            script(&[(50, "a"), (25, "b")]),
            Err(ControllerError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            script(&[(25, "a"), (25, "b")]),
            Err(ControllerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_threshold_of_100() {
        assert!(script(&[(100, "done")]).is_err());
    }

    #[test]
    fn test_rejects_blank_label() {
        assert!(script(&[(10, "  ")]).is_err());
    }

    #[test]
    fn test_default_scripts_are_valid() {
        for mode in [JobMode::Enhance, JobMode::Edit] {
            let checkpoints = default_script(mode);
            assert_eq!(checkpoints.len(), 4);
            assert!(CheckpointScript::new(checkpoints).is_ok());
        }
        assert_eq!(default_script(JobMode::Edit)[0].label, "Parsing Video...");
    }

    #[test]
    fn test_default_labels_keep_engine_names() {
        let enhance = default_script(JobMode::Enhance);
        assert_eq!(enhance[1].label, "Applying Topaz AI Model...");

        let edit = default_script(JobMode::Edit);
        assert_eq!(edit[2].label, "Rendering with FFMPEG...");
        assert_eq!(edit[3].label, "Finalizing...");
    }

    #[test]
    fn test_studio_script_mentions_settings() {
        let mut request = ProcessRequest::new("clip.mp4", JobMode::Enhance);
        request.output_format = OutputFormat::Mkv;
        request.enhance = Some(EnhanceSettings {
            model: AiModel::Upscale,
            upscale_factor: 4,
        });

        let checkpoints = studio_script(&request);
        assert_eq!(checkpoints[0].label, "Analyzing Video Frames...");
        assert_eq!(checkpoints[1].label, "Applying AI Upscale Model...");
        assert_eq!(checkpoints[2].label, "Upscaling Resolution (x4)...");
        assert_eq!(checkpoints[3].label, "Encoding Output (MKV)");
    }

    #[test]
    fn test_studio_script_for_trim() {
        let mut request = ProcessRequest::new("clip.mp4", JobMode::Edit);
        request.edit = Some(EditSettings {
            tool: EditTool::Trim,
            trim_start: 1.5,
            trim_end: 9.0,
        });

        let checkpoints = studio_script(&request);
        assert_eq!(checkpoints[1].label, "Trimming 1.5s to 9s...");
        assert!(CheckpointScript::new(checkpoints).is_ok());
    }
}
