//! Frame ranges and extraction plans.

use serde::{Deserialize, Serialize};

use crate::timecode::Timecode;

/// Inclusive range of frame numbers.
///
/// Valid ranges have `start <= end`; the planner rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: u64,
    pub end: u64,
}

impl FrameRange {
    /// Create a range from its bounds.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Range covering exactly one frame.
    pub fn single(frame: u64) -> Self {
        Self {
            start: frame,
            end: frame,
        }
    }

    /// Whether the range covers a single frame.
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    /// Number of frames covered.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start) + 1
    }

    /// Whether `frame` lies inside the range.
    pub fn contains(&self, frame: u64) -> bool {
        self.start <= frame && frame <= self.end
    }

    /// Text rendering: `"1001"` or `"1001-1050"`.
    pub fn label(&self) -> String {
        if self.is_single() {
            self.start.to_string()
        } else {
            format!("{}-{}", self.start, self.end)
        }
    }
}

/// Fully resolved parameters for rendering one consolidated range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionPlan {
    /// Canonical location this range belongs to.
    pub location: String,
    pub range: FrameRange,
    /// Midpoint of the range, used for the thumbnail.
    pub representative_frame: u64,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub label: String,
    pub start_timecode: Timecode,
    pub end_timecode: Timecode,
    /// Unique file stem for rendered artifacts (thumbnail, segment).
    pub output_stem: String,
}

impl ExtractionPlan {
    /// Timecode range string: `"<tc>"` or `"<tc1> - <tc2>"`.
    pub fn timecode_range(&self) -> String {
        if self.range.is_single() {
            self.start_timecode.to_string()
        } else {
            format!("{} - {}", self.start_timecode, self.end_timecode)
        }
    }

    /// Segment duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_single_and_span() {
        assert_eq!(FrameRange::single(1001).label(), "1001");
        assert_eq!(FrameRange::new(1001, 1050).label(), "1001-1050");
    }

    #[test]
    fn len_and_contains() {
        let range = FrameRange::new(5, 7);
        assert_eq!(range.len(), 3);
        assert!(range.contains(5));
        assert!(range.contains(7));
        assert!(!range.contains(8));
    }
}
