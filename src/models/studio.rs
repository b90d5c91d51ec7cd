use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::models::job::{JobId, JobMode, JobState};

/// Video containers the studio can write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Mp4,
    Mkv,
    Avi,
    Ts,
    Webm,
    M3u8,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Mkv => "mkv",
            OutputFormat::Avi => "avi",
            OutputFormat::Ts => "ts",
            OutputFormat::Webm => "webm",
            OutputFormat::M3u8 => "m3u8",
        }
    }
}

/// Extensions accepted for uploaded source videos.
pub const SUPPORTED_INPUTS: &[&str] = &["mp4", "avi", "mkv", "ts", "m3u8", "webm"];

/// Enhancement models offered in AI enhance mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AiModel {
    #[default]
    Auto,
    Upscale,
    Clear,
    Unblur,
    Optical,
}

impl AiModel {
    pub fn label(&self) -> &'static str {
        match self {
            AiModel::Auto => "Auto Enhance",
            AiModel::Upscale => "AI Upscale",
            AiModel::Clear => "Video Clear",
            AiModel::Unblur => "Motion Unblur",
            AiModel::Optical => "Optical Flow",
        }
    }
}

/// Operations offered in editing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EditTool {
    #[default]
    Compress,
    Trim,
    Split,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EnhanceSettings {
    #[garde(skip)]
    #[serde(default)]
    pub model: AiModel,

    #[garde(range(min = 1, max = 4))]
    #[serde(default = "default_upscale_factor")]
    pub upscale_factor: u8,
}

impl Default for EnhanceSettings {
    fn default() -> Self {
        Self {
            model: AiModel::default(),
            upscale_factor: default_upscale_factor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EditSettings {
    #[garde(skip)]
    #[serde(default)]
    pub tool: EditTool,

    /// Trim start in seconds. Checked only for the trim tool.
    #[garde(custom(starts_at_or_after_zero(&self.tool)))]
    #[serde(default)]
    pub trim_start: f64,

    /// Trim end in seconds. Checked only for the trim tool.
    #[garde(custom(ends_after(&self.tool, &self.trim_start)))]
    #[serde(default = "default_trim_end")]
    pub trim_end: f64,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            tool: EditTool::default(),
            trim_start: 0.0,
            trim_end: default_trim_end(),
        }
    }
}

/// A request to process one uploaded video.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProcessRequest {
    #[garde(length(min = 1, max = 255), custom(supported_input))]
    pub file_name: String,

    #[garde(skip)]
    pub mode: JobMode,

    #[garde(skip)]
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Ignored unless `mode` is enhance.
    #[garde(custom(used_by(&self.mode, JobMode::Enhance)))]
    pub enhance: Option<EnhanceSettings>,

    /// Ignored unless `mode` is edit.
    #[garde(custom(used_by(&self.mode, JobMode::Edit)))]
    pub edit: Option<EditSettings>,
}

impl ProcessRequest {
    pub fn new(file_name: impl Into<String>, mode: JobMode) -> Self {
        Self {
            file_name: file_name.into(),
            mode,
            output_format: OutputFormat::default(),
            enhance: None,
            edit: None,
        }
    }

    /// Settings for the selected mode; missing settings fall back to defaults.
    pub fn settings(&self) -> ModeSettings {
        match self.mode {
            JobMode::Enhance => ModeSettings::Enhance(self.enhance.clone().unwrap_or_default()),
            JobMode::Edit => ModeSettings::Edit(self.edit.clone().unwrap_or_default()),
        }
    }
}

/// Resolved settings for the request's mode.
#[derive(Debug, Clone)]
pub enum ModeSettings {
    Enhance(EnhanceSettings),
    Edit(EditSettings),
}

/// Response after submitting a processing request.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: JobId,
    pub state: JobState,
    pub status: String,
    pub message: String,
}

fn default_upscale_factor() -> u8 {
    2
}

fn default_trim_end() -> f64 {
    10.0
}

fn supported_input(file_name: &str, _ctx: &()) -> garde::Result {
    let (stem, extension) = file_name.rsplit_once('.').unwrap_or((file_name, ""));
    if stem.trim().is_empty() {
        return Err(garde::Error::new("file name has no stem"));
    }

    if SUPPORTED_INPUTS.contains(&extension.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "unsupported video type, expected one of {}",
            SUPPORTED_INPUTS.join(", ")
        )))
    }
}

/// Validate nested settings only when the request's mode uses them.
fn used_by<'a, T>(
    mode: &'a JobMode,
    wanted: JobMode,
) -> impl FnOnce(&Option<T>, &()) -> garde::Result + 'a
where
    T: Validate<Context = ()> + 'a,
{
    move |settings, _| match settings {
        Some(settings) if *mode == wanted => settings
            .validate()
            .map_err(|report| garde::Error::new(report.to_string().trim_end().to_string())),
        _ => Ok(()),
    }
}

fn starts_at_or_after_zero(tool: &EditTool) -> impl FnOnce(&f64, &()) -> garde::Result + '_ {
    move |start, _| {
        if *tool != EditTool::Trim || *start >= 0.0 {
            Ok(())
        } else {
            Err(garde::Error::new("trim start must not be negative"))
        }
    }
}

fn ends_after<'a>(
    tool: &'a EditTool,
    start: &'a f64,
) -> impl FnOnce(&f64, &()) -> garde::Result + 'a {
    move |end, _| {
        if *tool != EditTool::Trim || end > start {
            Ok(())
        } else {
            Err(garde::Error::new("trim end must be after trim start"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_studio_form() {
        let enhance = EnhanceSettings::default();
        assert_eq!(enhance.model, AiModel::Auto);
        assert_eq!(enhance.upscale_factor, 2);

        let edit = EditSettings::default();
        assert_eq!(edit.tool, EditTool::Compress);
        assert_eq!(edit.trim_end, 10.0);
    }

    #[test]
    fn test_request_accepts_supported_upload() {
        let request = ProcessRequest::new("holiday.MKV", JobMode::Enhance);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_rejects_unknown_extension() {
        let request = ProcessRequest::new("notes.txt", JobMode::Edit);
        assert!(request.validate().is_err());

        let request = ProcessRequest::new("no_extension", JobMode::Edit);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_upscale_factor_out_of_range() {
        let mut request = ProcessRequest::new("clip.mp4", JobMode::Enhance);
        request.enhance = Some(EnhanceSettings {
            model: AiModel::Upscale,
            upscale_factor: 8,
        });
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_trim_range_must_be_ordered() {
        let mut request = ProcessRequest::new("clip.mp4", JobMode::Edit);
        request.edit = Some(EditSettings {
            tool: EditTool::Trim,
            trim_start: 12.0,
            trim_end: 4.0,
        });
        assert!(request.validate().is_err());

        request.edit = Some(EditSettings {
            tool: EditTool::Trim,
            trim_start: 2.5,
            trim_end: 4.0,
        });
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_settings_for_other_mode_are_ignored() {
        let request: ProcessRequest = serde_json::from_str(
            r#"{"file_name":"a.mp4","mode":"edit","enhance":{"upscale_factor":9}}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());

        let request: ProcessRequest = serde_json::from_str(
            r#"{"file_name":"a.mp4","mode":"enhance","edit":{"tool":"trim","trim_start":5,"trim_end":1}}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());

        let request: ProcessRequest = serde_json::from_str(
            r#"{"file_name":"a.mp4","mode":"enhance","enhance":{"upscale_factor":9}}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_trim_range_ignored_for_other_tools() {
        for tool in [EditTool::Compress, EditTool::Split] {
            let mut request = ProcessRequest::new("clip.mp4", JobMode::Edit);
            request.edit = Some(EditSettings {
                tool,
                trim_start: 12.0,
                trim_end: 4.0,
            });
            assert!(request.validate().is_ok(), "{} should ignore trim range", tool);
        }

        let mut request = ProcessRequest::new("clip.mp4", JobMode::Edit);
        request.edit = Some(EditSettings {
            tool: EditTool::Trim,
            trim_start: -1.0,
            trim_end: 4.0,
        });
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_accepts_playlist_upload() {
        assert!(ProcessRequest::new("stream.m3u8", JobMode::Edit).validate().is_ok());
    }

    #[test]
    fn test_request_rejects_missing_stem() {
        assert!(ProcessRequest::new(".mp4", JobMode::Enhance).validate().is_err());
        assert!(ProcessRequest::new("  .webm", JobMode::Edit).validate().is_err());
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: ProcessRequest =
            serde_json::from_str(r#"{"file_name":"a.webm","mode":"tools"}"#).unwrap();
        assert_eq!(request.mode, JobMode::Edit);
        assert_eq!(request.output_format, OutputFormat::Mp4);
        match request.settings() {
            ModeSettings::Edit(edit) => assert_eq!(edit.tool, EditTool::Compress),
            other => panic!("unexpected settings: {:?}", other),
        }
    }

    #[test]
    fn test_output_format_wire_names() {
        let format: OutputFormat = serde_json::from_str("\"M3U8\"").unwrap();
        assert_eq!(format, OutputFormat::M3u8);
        assert_eq!(format.extension(), "m3u8");
        assert_eq!("webm".parse::<OutputFormat>().unwrap(), OutputFormat::Webm);
    }
}
