//! Review report, the upload plan derived from it, and report writers.
//!
//! Rows keep the order established during planning: canonical-location
//! order, then ascending range. The segment upload stage reads its work
//! from [`Report::upload_plans`], never from anything else.

mod summary;
mod writer;

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ExtractionPlan, LocationSet};

pub use summary::{AmbiguousMatch, ExcludedRange, ItemFailure, RunSummary};
pub use writer::{JsonReportWriter, ReportWriter, TsvReportWriter, THUMBNAIL_DIR};

/// Errors from writing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Job metadata shown above the rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub producer: String,
    pub operator: String,
    pub job: String,
    pub notes: String,
}

impl From<&LocationSet> for ReportHeader {
    fn from(set: &LocationSet) -> Self {
        Self {
            producer: set.producer.clone(),
            operator: set.operator.clone(),
            job: set.job.clone(),
            notes: set.notes.clone(),
        }
    }
}

/// Rendered representative frame of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub frame: u64,
    /// File name the image is written under, relative to the thumbnail dir.
    pub file_name: String,
    #[serde(skip)]
    pub png: Vec<u8>,
}

impl Thumbnail {
    pub fn new(frame: u64, output_stem: &str, png: Vec<u8>) -> Self {
        Self {
            frame,
            file_name: format!("{}.png", output_stem),
            png,
        }
    }
}

/// Timing of the segment a row refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub output_stem: String,
}

/// One report row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub location: String,
    pub label: String,
    pub timecode_range: String,
    /// `None` when the thumbnail could not be rendered.
    pub thumbnail: Option<Thumbnail>,
    pub segment: SegmentSpec,
}

impl ReportRow {
    /// Row for `plan`, with or without a rendered thumbnail.
    pub fn from_plan(plan: &ExtractionPlan, thumbnail: Option<Thumbnail>) -> Self {
        Self {
            location: plan.location.clone(),
            label: plan.label.clone(),
            timecode_range: plan.timecode_range(),
            thumbnail,
            segment: SegmentSpec {
                start_seconds: plan.start_seconds,
                end_seconds: plan.end_seconds,
                output_stem: plan.output_stem.clone(),
            },
        }
    }
}

/// Work item of the segment upload stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPlan {
    pub location: String,
    pub label: String,
    pub timecode_range: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub output_stem: String,
}

impl UploadPlan {
    /// `"<label>\t<timecode range>"`.
    pub fn entry(&self) -> String {
        format!("{}\t{}", self.label, self.timecode_range)
    }
}

/// Result of one review run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub header: ReportHeader,
    pub rows: Vec<ReportRow>,
    pub summary: RunSummary,
}

impl Report {
    pub fn new(header: ReportHeader) -> Self {
        Self {
            header,
            rows: Vec::new(),
            summary: RunSummary::default(),
        }
    }

    /// Upload work derived from the rows, in row order.
    pub fn upload_plans(&self) -> Vec<UploadPlan> {
        self.rows
            .iter()
            .map(|row| UploadPlan {
                location: row.location.clone(),
                label: row.label.clone(),
                timecode_range: row.timecode_range.clone(),
                start_seconds: row.segment.start_seconds,
                end_seconds: row.segment.end_seconds,
                output_stem: row.segment.output_stem.clone(),
            })
            .collect()
    }

    /// Rows belonging to `location`.
    pub fn rows_for<'a>(&'a self, location: &'a str) -> impl Iterator<Item = &'a ReportRow> + 'a {
        self.rows.iter().filter(move |r| r.location == location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrameRange;
    use crate::planning::plan;

    #[test]
    fn upload_plans_follow_rows() {
        let mut report = Report::default();
        let first = plan("/mnt/show/file1", FrameRange::new(1, 3), 24.0).unwrap();
        let second = plan("/mnt/show/file1", FrameRange::single(10), 24.0).unwrap();
        report.rows.push(ReportRow::from_plan(&first, None));
        report.rows.push(ReportRow::from_plan(
            &second,
            Some(Thumbnail::new(10, &second.output_stem, vec![1, 2, 3])),
        ));

        let plans = report.upload_plans();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].entry(), "1-3\t00:00:00:01 - 00:00:00:03");
        assert_eq!(plans[1].entry(), "10\t00:00:00:10");
        assert_eq!(plans[1].output_stem, "file1_10");
        assert_eq!(report.rows_for("/mnt/show/file1").count(), 2);
    }

    #[test]
    fn thumbnail_bytes_are_not_serialized() {
        let thumb = Thumbnail::new(5, "file1_5", vec![0x89, 0x50]);
        let json = serde_json::to_string(&thumb).unwrap();
        assert!(json.contains("file1_5.png"));
        assert!(!json.contains("png\":["));
    }
}
