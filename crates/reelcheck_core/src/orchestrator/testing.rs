//! Fakes shared by the orchestrator tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tempfile::TempDir;

use super::types::{Context, RunOptions};
use crate::logging::{init_test_tracing, LogConfig, RunLogger};
use crate::media::{FrameRate, MediaError, MediaInfo, MediaRenderer, MediaResult};
use crate::models::{LocationSet, ScanRecord};
use crate::upload::{Credentials, UploadError, UploadResponse, UploadResult, UploadService};

/// Renderer that writes tiny files and fails on chosen frames.
#[derive(Default)]
pub struct FakeRenderer {
    pub fail_frames: HashSet<u64>,
    pub out_dir: PathBuf,
    pub calls: Mutex<Vec<u64>>,
}

impl MediaRenderer for FakeRenderer {
    fn thumbnail(&self, _path: &Path, frame: u64, timeout: Duration) -> MediaResult<Vec<u8>> {
        self.calls.lock().push(frame);
        if self.fail_frames.contains(&frame) {
            return Err(MediaError::TimedOut {
                tool: "ffmpeg".to_string(),
                timeout,
            });
        }
        Ok(format!("png:{}", frame).into_bytes())
    }

    fn extract_segment(
        &self,
        _path: &Path,
        start_seconds: f64,
        _end_seconds: f64,
        output_stem: &str,
        _timeout: Duration,
    ) -> MediaResult<PathBuf> {
        if output_stem.contains("broken") {
            return Err(MediaError::EmptyOutput {
                tool: "ffmpeg".to_string(),
            });
        }
        let path = self.out_dir.join(format!("{}.mp4", output_stem));
        std::fs::write(&path, format!("{:.3}", start_seconds)).map_err(|source| {
            MediaError::Io {
                operation: "writing fake segment".to_string(),
                source,
            }
        })?;
        Ok(path)
    }
}

/// Upload service answering with a fixed status per file stem.
#[derive(Default)]
pub struct FakeUploader {
    /// Stems rejected with HTTP 403.
    pub reject: HashSet<String>,
    /// Stems failing at the transport level.
    pub unreachable: HashSet<String>,
    pub uploaded: Mutex<Vec<String>>,
}

impl UploadService for FakeUploader {
    fn upload(
        &self,
        artifact: &Path,
        credentials: &Credentials,
        _timeout: Duration,
    ) -> UploadResult<UploadResponse> {
        assert_eq!(credentials.token, "test-token");
        let stem = artifact
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.unreachable.contains(&stem) {
            return Err(UploadError::Network("connection refused".to_string()));
        }
        if self.reject.contains(&stem) {
            return Ok(UploadResponse {
                status: 403,
                body: "{\"error\":\"forbidden\"}".to_string(),
            });
        }

        self.uploaded.lock().push(stem);
        Ok(UploadResponse {
            status: 201,
            body: "{}".to_string(),
        })
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("test-token", "parent-1")
}

/// Location set with the given canonical paths.
pub fn location_set(locations: &[&str]) -> LocationSet {
    LocationSet::new(
        "Joe Schmoe",
        "John Doe",
        "Dirtfixing",
        "Please clean files",
        locations.iter().map(|l| l.to_string()),
    )
}

/// 24 fps, 100 second media.
pub fn media_info() -> MediaInfo {
    MediaInfo::new("/media/reel1.mov", 100.0, FrameRate::new(24, 1))
}

/// Context with a [`FakeRenderer`] writing into a temp dir.
pub fn context_with(
    locations: LocationSet,
    scans: Vec<ScanRecord>,
    renderer: impl FnOnce(&Path) -> FakeRenderer,
) -> (Context, TempDir) {
    init_test_tracing();
    let dir = tempfile::tempdir().unwrap();
    let renderer = renderer(dir.path());
    let logger = Arc::new(RunLogger::detached("test", LogConfig::default()));

    let options = RunOptions {
        workers: 3,
        tool_timeout: Duration::from_secs(5),
        upload_timeout: Duration::from_secs(5),
        ..RunOptions::default()
    };

    let ctx = Context::new("test", locations, scans, media_info(), Arc::new(renderer), logger)
        .with_options(options);
    (ctx, dir)
}

/// Context with the default fake renderer.
pub fn test_context(locations: Vec<&str>, scans: Vec<ScanRecord>) -> (Context, TempDir) {
    context_with(location_set(&locations), scans, |dir| FakeRenderer {
        out_dir: dir.to_path_buf(),
        ..FakeRenderer::default()
    })
}
