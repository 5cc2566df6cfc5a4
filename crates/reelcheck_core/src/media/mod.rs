//! External media-tool contracts and the ffmpeg/ffprobe implementation.
//!
//! The pipeline only sees the [`MediaProbe`] and [`MediaRenderer`] traits.
//! [`FfmpegTools`] implements both with structured argument lists; paths
//! are never interpolated into a shell command.

mod ffmpeg;
mod process;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ffmpeg::FfmpegTools;
pub use process::{run_with_timeout, ProcessOutput};

/// Errors from external media tools.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The media file does not exist.
    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),

    /// The tool could not be started.
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The tool exited unsuccessfully.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The tool did not finish before its deadline and was killed.
    #[error("{tool} timed out after {timeout:?}")]
    TimedOut { tool: String, timeout: Duration },

    /// Tool output could not be interpreted.
    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// The tool succeeded but produced nothing.
    #[error("{tool} produced no output")]
    EmptyOutput { tool: String },

    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl MediaError {
    /// Create a parse error.
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Whether the failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, MediaError::TimedOut { .. })
    }
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Rational frame rate as reported by the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRate {
    pub numerator: u64,
    pub denominator: u64,
}

impl FrameRate {
    pub fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Frames per second. A zero denominator is read as `numerator/1`.
    pub fn as_f64(&self) -> f64 {
        if self.denominator == 0 {
            self.numerator as f64
        } else {
            self.numerator as f64 / self.denominator as f64
        }
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for FrameRate {
    type Err = MediaError;

    /// Parse `num/den` (or a bare integer).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse = |part: &str| {
            part.trim()
                .parse::<u64>()
                .map_err(|e| MediaError::parse("frame rate", format!("'{}': {}", s, e)))
        };

        match s.split_once('/') {
            Some((num, den)) => Ok(FrameRate::new(parse(num)?, parse(den)?)),
            None => Ok(FrameRate::new(parse(s)?, 1)),
        }
    }
}

/// Probing contract: duration and frame rate of a media file.
pub trait MediaProbe: Send + Sync {
    /// Duration in seconds.
    fn duration(&self, path: &Path, timeout: Duration) -> MediaResult<f64>;

    /// Frame rate of the first video stream.
    fn frame_rate(&self, path: &Path, timeout: Duration) -> MediaResult<FrameRate>;
}

/// Rendering contract: thumbnails and segment extraction.
pub trait MediaRenderer: Send + Sync {
    /// Encoded image bytes of a single frame.
    fn thumbnail(&self, path: &Path, frame: u64, timeout: Duration) -> MediaResult<Vec<u8>>;

    /// Extract `[start_seconds, end_seconds)` into a local artifact named
    /// after `output_stem`, returning its path.
    fn extract_segment(
        &self,
        path: &Path,
        start_seconds: f64,
        end_seconds: f64,
        output_stem: &str,
        timeout: Duration,
    ) -> MediaResult<PathBuf>;
}

/// Probed facts about the media file under review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub duration_seconds: f64,
    pub frame_rate: FrameRate,
    /// Frames per second derived from `frame_rate`.
    pub fps: f64,
    /// `floor(duration × fps)`: ranges starting beyond this are excluded.
    pub total_frames: u64,
}

impl MediaInfo {
    /// Build media info from known values.
    pub fn new(path: impl Into<PathBuf>, duration_seconds: f64, frame_rate: FrameRate) -> Self {
        let fps = frame_rate.as_f64();
        let total_frames = (duration_seconds * fps).max(0.0).floor() as u64;
        Self {
            path: path.into(),
            duration_seconds,
            frame_rate,
            fps,
            total_frames,
        }
    }

    /// Probe duration and frame rate of `path`.
    pub fn probe(probe: &dyn MediaProbe, path: &Path, timeout: Duration) -> MediaResult<Self> {
        let duration = probe.duration(path, timeout)?;
        let frame_rate = probe.frame_rate(path, timeout)?;
        let info = Self::new(path, duration, frame_rate);

        if !(info.fps.is_finite() && info.fps > 0.0) {
            return Err(MediaError::parse(
                "frame rate",
                format!("{} is not a usable rate", frame_rate),
            ));
        }

        tracing::info!(
            "Probed {}: {:.3}s at {} ({:.3} fps), {} frames",
            path.display(),
            info.duration_seconds,
            info.frame_rate,
            info.fps,
            info.total_frames
        );
        Ok(info)
    }
}
