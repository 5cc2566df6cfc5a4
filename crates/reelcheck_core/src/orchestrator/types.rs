//! Core types for the review pipeline.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::pipeline::CancelHandle;
use crate::config::Settings;
use crate::logging::RunLogger;
use crate::matching::MatchOutcome;
use crate::media::{MediaInfo, MediaRenderer};
use crate::models::{ExtractionPlan, FrameRange, LocationSet, ScanRecord};
use crate::report::{Report, RunSummary};
use crate::upload::{Credentials, UploadService};

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Tunables for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Render workers; zero is treated as one.
    pub workers: usize,
    /// Drop ranges that start past the last frame of the media.
    pub apply_frame_ceiling: bool,
    /// Deadline for each media-tool invocation.
    pub tool_timeout: Duration,
    /// Deadline for each upload request.
    pub upload_timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl RunOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            workers: settings.render.workers,
            apply_frame_ceiling: settings.render.apply_frame_ceiling,
            tool_timeout: Duration::from_secs(settings.media.tool_timeout_secs),
            upload_timeout: Duration::from_secs(settings.upload.request_timeout_secs),
        }
    }
}

/// Read-only context passed to pipeline steps.
///
/// Holds the ingested records, the probed media and the collaborators.
/// Mutable results go in [`RunState`].
pub struct Context {
    pub run_name: String,
    pub locations: LocationSet,
    pub scans: Vec<ScanRecord>,
    /// The video the canonical locations' frames are rendered from.
    pub media: MediaInfo,
    pub options: RunOptions,
    pub renderer: Arc<dyn MediaRenderer>,
    pub uploader: Option<Arc<dyn UploadService>>,
    pub credentials: Option<Credentials>,
    pub logger: Arc<RunLogger>,
    cancel: CancelHandle,
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    pub fn new(
        run_name: impl Into<String>,
        locations: LocationSet,
        scans: Vec<ScanRecord>,
        media: MediaInfo,
        renderer: Arc<dyn MediaRenderer>,
        logger: Arc<RunLogger>,
    ) -> Self {
        Self {
            run_name: run_name.into(),
            locations,
            scans,
            media,
            options: RunOptions::default(),
            renderer,
            uploader: None,
            credentials: None,
            logger,
            cancel: CancelHandle::new(),
            progress_callback: None,
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable segment upload through `uploader`.
    pub fn with_uploader(
        mut self,
        uploader: Arc<dyn UploadService>,
        credentials: Credentials,
    ) -> Self {
        self.uploader = Some(uploader);
        self.credentials = Some(credentials);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Handle that stops the run before the next plan.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Total-frame ceiling, when ceiling filtering is enabled.
    pub fn frame_ceiling(&self) -> Option<u64> {
        self.options
            .apply_frame_ceiling
            .then_some(self.media.total_frames)
    }

    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }
}

/// Phase of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    #[default]
    Idle,
    Matching,
    Consolidating,
    Planning,
    Rendering,
    Done,
    Failed(String),
}

impl RunPhase {
    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Failed(_))
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "Idle"),
            RunPhase::Matching => write!(f, "Matching"),
            RunPhase::Consolidating => write!(f, "Consolidating"),
            RunPhase::Planning => write!(f, "Planning"),
            RunPhase::Rendering => write!(f, "Rendering"),
            RunPhase::Done => write!(f, "Done"),
            RunPhase::Failed(reason) => write!(f, "Failed({})", reason),
        }
    }
}

/// Consolidated ranges of one matched scan record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedRanges {
    pub location: String,
    pub record_index: usize,
    pub scan_path: String,
    pub ranges: Vec<FrameRange>,
}

/// Output of the segment upload stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentOutput {
    pub attempted: usize,
    pub uploaded: usize,
}

/// Mutable run state that accumulates results from pipeline steps.
///
/// Each step fills its own section; later steps only read earlier ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: String,
    pub started_at: Option<String>,
    pub phase: RunPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchOutcome>>,
    /// In canonical-location order, then scan-record order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairs: Option<Vec<MatchedRanges>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plans: Option<Vec<ExtractionPlan>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<SegmentOutput>,
    pub summary: RunSummary,
}

impl RunState {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    pub fn plan_count(&self) -> usize {
        self.plans.as_ref().map_or(0, Vec::len)
    }

    /// The finished report with the run summary attached.
    pub fn into_report(self) -> Report {
        let mut report = self.report.unwrap_or_default();
        report.summary = self.summary;
        report
    }
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    /// Nothing to do (not an error).
    Skipped(String),
}
