//! What a run skipped, failed or uploaded.

use serde::{Deserialize, Serialize};

/// A scan record that matched more than one canonical location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguousMatch {
    pub scan_path: String,
    pub chosen: String,
    pub also_matched: Vec<String>,
}

/// A consolidated range dropped because it starts past the media's last frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedRange {
    pub location: String,
    pub label: String,
}

/// A per-item rendering or upload failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    /// Output stem of the affected plan.
    pub item: String,
    /// HTTP status, when the service answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl ItemFailure {
    pub fn new(item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Summary of a completed (or cancelled) run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub unmatched_scans: Vec<String>,
    pub ambiguous_matches: Vec<AmbiguousMatch>,
    pub locations_without_scans: Vec<String>,
    pub excluded_ranges: Vec<ExcludedRange>,
    pub thumbnail_failures: Vec<ItemFailure>,
    pub segment_failures: Vec<ItemFailure>,
    pub upload_failures: Vec<ItemFailure>,
    /// Output stems of successfully uploaded segments.
    pub uploaded: Vec<String>,
    pub cancelled: bool,
}

impl RunSummary {
    /// Whether any plan failed to render or upload.
    pub fn has_failures(&self) -> bool {
        !self.thumbnail_failures.is_empty()
            || !self.segment_failures.is_empty()
            || !self.upload_failures.is_empty()
    }

    /// Number of skipped inputs (unmatched scans and excluded ranges).
    pub fn skipped_count(&self) -> usize {
        self.unmatched_scans.len() + self.excluded_ranges.len()
    }

    /// Human-readable multi-line summary.
    pub fn render_text(&self) -> String {
        let mut lines = Vec::new();

        let mut section = |title: &str, items: Vec<String>| {
            if items.is_empty() {
                return;
            }
            lines.push(format!("{} ({}):", title, items.len()));
            lines.extend(items.into_iter().map(|i| format!("  {}", i)));
        };

        section("Unmatched scan records", self.unmatched_scans.clone());
        section(
            "Ambiguous matches",
            self.ambiguous_matches
                .iter()
                .map(|a| {
                    format!(
                        "{} -> {} (also {})",
                        a.scan_path,
                        a.chosen,
                        a.also_matched.join(", ")
                    )
                })
                .collect(),
        );
        section("Locations without scans", self.locations_without_scans.clone());
        section(
            "Ranges past end of media",
            self.excluded_ranges
                .iter()
                .map(|r| format!("{} {}", r.location, r.label))
                .collect(),
        );
        section("Thumbnail failures", describe(&self.thumbnail_failures));
        section("Segment failures", describe(&self.segment_failures));
        section("Upload failures", describe(&self.upload_failures));
        section("Uploaded", self.uploaded.clone());

        if self.cancelled {
            lines.push("Run was cancelled before all plans finished".to_string());
        }
        lines.join("\n")
    }
}

fn describe(failures: &[ItemFailure]) -> Vec<String> {
    failures
        .iter()
        .map(|f| match f.status {
            Some(status) => format!("{}: HTTP {} {}", f.item, status, f.message),
            None => format!("{}: {}", f.item, f.message),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_renders_nothing() {
        let summary = RunSummary::default();
        assert!(!summary.has_failures());
        assert_eq!(summary.render_text(), "");
    }

    #[test]
    fn renders_failures_with_status() {
        let summary = RunSummary {
            unmatched_scans: vec!["/scan/file9".to_string()],
            upload_failures: vec![ItemFailure::new("file1_5", "denied").with_status(403)],
            ..RunSummary::default()
        };

        let text = summary.render_text();
        assert!(summary.has_failures());
        assert_eq!(summary.skipped_count(), 1);
        assert!(text.contains("Unmatched scan records (1):"));
        assert!(text.contains("file1_5: HTTP 403 denied"));
    }
}
