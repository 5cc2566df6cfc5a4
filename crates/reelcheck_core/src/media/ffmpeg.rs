//! ffprobe/ffmpeg implementation of the media contracts.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use super::process::run_with_timeout;
use super::{FrameRate, MediaError, MediaProbe, MediaRenderer, MediaResult};
use crate::config::MediaSettings;

/// Media tools backed by the ffmpeg and ffprobe binaries.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    thumbnail_width: u32,
    thumbnail_height: u32,
    segment_dir: PathBuf,
    segment_extension: String,
    segment_codec_args: Vec<String>,
}

impl FfmpegTools {
    /// Tools using the binaries found on `PATH` and default render options.
    pub fn new(segment_dir: impl Into<PathBuf>) -> Self {
        Self::from_settings(&MediaSettings::default(), segment_dir)
    }

    /// Tools configured from the `[media]` settings section.
    pub fn from_settings(settings: &MediaSettings, segment_dir: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: PathBuf::from(&settings.ffmpeg_path),
            ffprobe: PathBuf::from(&settings.ffprobe_path),
            thumbnail_width: settings.thumbnail_width,
            thumbnail_height: settings.thumbnail_height,
            segment_dir: segment_dir.into(),
            segment_extension: settings.segment_extension.clone(),
            segment_codec_args: settings.segment_codec_args.clone(),
        }
    }

    /// Directory extracted segments are written to.
    pub fn segment_dir(&self) -> &Path {
        &self.segment_dir
    }

    /// Check that both binaries can be executed.
    pub fn is_available(&self) -> bool {
        [&self.ffmpeg, &self.ffprobe].iter().all(|bin| {
            Command::new(bin)
                .arg("-version")
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        })
    }

    fn ensure_source(path: &Path) -> MediaResult<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(MediaError::SourceNotFound(path.to_path_buf()))
        }
    }

    /// Run an ffprobe query printing a single bare value.
    fn probe_value(&self, path: &Path, args: &[&str], timeout: Duration) -> MediaResult<String> {
        Self::ensure_source(path)?;

        let mut cmd = Command::new(&self.ffprobe);
        cmd.arg("-v").arg("error");
        cmd.args(args);
        cmd.arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(path);

        let output = run_with_timeout(&mut cmd, "ffprobe", timeout)?;
        let text = String::from_utf8_lossy(&output.stdout);
        let value = text.lines().next().unwrap_or("").trim().to_string();

        if value.is_empty() {
            return Err(MediaError::EmptyOutput {
                tool: "ffprobe".to_string(),
            });
        }
        Ok(value)
    }

    /// Video filter selecting one frame and scaling it for the report.
    fn thumbnail_filter(&self, frame: u64) -> String {
        format!(
            "select=eq(n\\,{}),scale={}:{}",
            frame, self.thumbnail_width, self.thumbnail_height
        )
    }

    /// Output path for a segment stem.
    pub fn segment_path(&self, output_stem: &str) -> PathBuf {
        self.segment_dir
            .join(format!("{}.{}", output_stem, self.segment_extension))
    }
}

impl MediaProbe for FfmpegTools {
    fn duration(&self, path: &Path, timeout: Duration) -> MediaResult<f64> {
        let value = self.probe_value(path, &["-show_entries", "format=duration"], timeout)?;
        value
            .parse::<f64>()
            .map_err(|e| MediaError::parse("duration", format!("'{}': {}", value, e)))
    }

    fn frame_rate(&self, path: &Path, timeout: Duration) -> MediaResult<FrameRate> {
        let value = self.probe_value(
            path,
            &[
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=r_frame_rate",
            ],
            timeout,
        )?;
        value.parse()
    }
}

impl MediaRenderer for FfmpegTools {
    fn thumbnail(&self, path: &Path, frame: u64, timeout: Duration) -> MediaResult<Vec<u8>> {
        Self::ensure_source(path)?;

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg("-v")
            .arg("error")
            .arg("-i")
            .arg(path)
            .arg("-vf")
            .arg(self.thumbnail_filter(frame))
            .arg("-vframes")
            .arg("1")
            .arg("-f")
            .arg("image2pipe")
            .arg("-vcodec")
            .arg("png")
            .arg("-");

        let output = run_with_timeout(&mut cmd, "ffmpeg", timeout)?;
        if output.stdout.is_empty() {
            // Frame beyond the last decodable one
            return Err(MediaError::EmptyOutput {
                tool: "ffmpeg".to_string(),
            });
        }
        Ok(output.stdout)
    }

    fn extract_segment(
        &self,
        path: &Path,
        start_seconds: f64,
        end_seconds: f64,
        output_stem: &str,
        timeout: Duration,
    ) -> MediaResult<PathBuf> {
        Self::ensure_source(path)?;

        fs::create_dir_all(&self.segment_dir).map_err(|source| MediaError::Io {
            operation: format!("creating {}", self.segment_dir.display()),
            source,
        })?;

        let output_path = self.segment_path(output_stem);
        let duration = (end_seconds - start_seconds).max(0.0);

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg("-y")
            .arg("-v")
            .arg("error")
            .arg("-ss")
            .arg(format!("{:.6}", start_seconds))
            .arg("-i")
            .arg(path)
            .arg("-t")
            .arg(format!("{:.6}", duration))
            .args(&self.segment_codec_args)
            .arg(&output_path);

        run_with_timeout(&mut cmd, "ffmpeg", timeout)?;

        let written = fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(MediaError::EmptyOutput {
                tool: "ffmpeg".to_string(),
            });
        }

        tracing::debug!(
            "Extracted {:.3}s-{:.3}s to {}",
            start_seconds,
            end_seconds,
            output_path.display()
        );
        Ok(output_path)
    }
}
