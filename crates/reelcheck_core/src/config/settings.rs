//! Settings struct with TOML-based sections.
//!
//! Every field has a serde default so a partial file (or none at all)
//! still yields a usable configuration.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    /// External media tools and render options.
    #[serde(default)]
    pub media: MediaSettings,

    /// Rendering stage behaviour.
    #[serde(default)]
    pub render: RenderSettings,

    /// Review-service upload.
    #[serde(default)]
    pub upload: UploadSettings,
}

/// Folders used by a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Where reports and thumbnails are written.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Scratch folder for extracted segments.
    #[serde(default = "default_work_folder")]
    pub work_folder: String,

    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Directory of the persistent record store.
    #[serde(default = "default_store_folder")]
    pub store_folder: String,
}

fn default_output_folder() -> String {
    "review_output".to_string()
}

fn default_work_folder() -> String {
    ".work".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_store_folder() -> String {
    ".reelcheck/store".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            work_folder: default_work_folder(),
            logs_folder: default_logs_folder(),
            store_folder: default_store_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when `RUST_LOG` is not set.
    #[serde(default)]
    pub level: LogLevel,

    /// Keep tool output out of the run log unless something fails.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines kept for error diagnosis.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            error_tail: default_error_tail(),
        }
    }
}

/// ffmpeg/ffprobe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSettings {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,

    #[serde(default = "default_thumbnail_width")]
    pub thumbnail_width: u32,

    #[serde(default = "default_thumbnail_height")]
    pub thumbnail_height: u32,

    /// Container extension of extracted segments.
    #[serde(default = "default_segment_extension")]
    pub segment_extension: String,

    /// Codec arguments placed between the input and output of a segment
    /// extraction.
    #[serde(default = "default_segment_codec_args")]
    pub segment_codec_args: Vec<String>,

    /// Deadline for a single tool invocation, in seconds.
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_thumbnail_width() -> u32 {
    96
}

fn default_thumbnail_height() -> u32 {
    74
}

fn default_segment_extension() -> String {
    "mp4".to_string()
}

fn default_segment_codec_args() -> Vec<String> {
    ["-c:v", "libx264", "-preset", "veryfast", "-an"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_tool_timeout() -> u64 {
    120
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
            thumbnail_width: default_thumbnail_width(),
            thumbnail_height: default_thumbnail_height(),
            segment_extension: default_segment_extension(),
            segment_codec_args: default_segment_codec_args(),
            tool_timeout_secs: default_tool_timeout(),
        }
    }
}

/// Rendering stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Concurrent render workers. Zero is treated as one.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Drop ranges starting past the last frame of the media.
    #[serde(default = "default_true")]
    pub apply_frame_ceiling: bool,
}

fn default_workers() -> usize {
    4
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            apply_frame_ceiling: true,
        }
    }
}

/// Review-service upload configuration.
///
/// The token itself is never stored here, only the name of the
/// environment variable holding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Asset id uploads are attached to.
    #[serde(default)]
    pub parent_asset_id: String,

    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://api.frame.io/v2/assets".to_string()
}

fn default_token_env() -> String {
    "REELCHECK_UPLOAD_TOKEN".to_string()
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            parent_asset_id: String::new(),
            token_env: default_token_env(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Media,
    Render,
    Upload,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Media,
        ConfigSection::Render,
        ConfigSection::Upload,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Media => "media",
            ConfigSection::Render => "render",
            ConfigSection::Upload => "upload",
        }
    }

    /// Comment written above the table in generated files.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Output, work, log and store directories",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Media => "ffmpeg/ffprobe invocation",
            ConfigSection::Render => "Thumbnail and segment rendering",
            ConfigSection::Upload => "Review upload (token is read from the named env var)",
        }
    }
}
