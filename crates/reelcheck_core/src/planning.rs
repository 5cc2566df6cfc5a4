//! Extraction planning for consolidated frame ranges.
//!
//! Turns a (location, range) pair into the timing, representative frame
//! and label needed to render a thumbnail or extract a segment.

use std::collections::HashSet;

use parking_lot::Mutex;
use thiserror::Error;

use crate::models::{final_segment, ExtractionPlan, FrameRange};
use crate::timecode::{frame_to_timecode, timecode_to_seconds, TimecodeError};

/// Errors from extraction planning.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    /// Range start lies after its end.
    #[error("Invalid range {start}-{end}: start is after end")]
    InvalidRange { start: u64, end: u64 },

    #[error(transparent)]
    Timecode(#[from] TimecodeError),
}

/// Result type for planning operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Build the extraction plan for one range of a canonical location.
///
/// A single-frame range gets a one-frame duration, since a zero-length
/// segment cannot be extracted.
pub fn plan(location: &str, range: FrameRange, rate: f64) -> PlanResult<ExtractionPlan> {
    if range.start > range.end {
        return Err(PlanError::InvalidRange {
            start: range.start,
            end: range.end,
        });
    }

    let start_timecode = frame_to_timecode(range.start, rate)?;
    let end_timecode = frame_to_timecode(range.end, rate)?;

    let start_seconds = timecode_to_seconds(&start_timecode, rate)?;
    let end_seconds = if range.is_single() {
        start_seconds + 1.0 / rate
    } else {
        timecode_to_seconds(&end_timecode, rate)?
    };

    let label = range.label();

    Ok(ExtractionPlan {
        location: location.to_string(),
        range,
        representative_frame: range.start + (range.end - range.start) / 2,
        start_seconds,
        end_seconds,
        output_stem: output_stem(location, &label),
        label,
        start_timecode,
        end_timecode,
    })
}

/// Base output stem for a location and label: `<file stem>_<label>`.
///
/// Derived from inputs only, never from wall-clock time.
pub fn output_stem(location: &str, label: &str) -> String {
    let name = final_segment(location);
    let stem = match name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => name,
    };

    let stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        format!("segment_{}", label)
    } else {
        format!("{}_{}", stem, label)
    }
}

/// Registry guaranteeing unique output stems within one run.
///
/// Safe to share between rendering workers.
#[derive(Debug, Default)]
pub struct OutputNames {
    taken: Mutex<HashSet<String>>,
}

impl OutputNames {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `stem`, appending `_2`, `_3`, ... if it is already taken.
    pub fn claim(&self, stem: &str) -> String {
        let mut taken = self.taken.lock();
        if taken.insert(stem.to_string()) {
            return stem.to_string();
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", stem, n);
            if taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Number of stems reserved so far.
    pub fn len(&self) -> usize {
        self.taken.lock().len()
    }

    /// Whether no stem has been reserved.
    pub fn is_empty(&self) -> bool {
        self.taken.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn single_frame_timing() {
        let plan = plan("/mnt/file1", FrameRange::single(100), 24.0).unwrap();

        assert!((plan.start_seconds - 4.1667).abs() < 1e-4);
        assert!((plan.end_seconds - 4.2083).abs() < 1e-4);
        assert!((plan.end_seconds - (plan.start_seconds + 1.0 / 24.0)).abs() < 1e-12);
        assert_eq!(plan.label, "100");
        assert_eq!(plan.representative_frame, 100);
        assert_eq!(plan.timecode_range(), "00:00:04:04");
    }

    #[test]
    fn span_timing_and_midpoint() {
        let plan = plan("/mnt/show/file1.dpx", FrameRange::new(1001, 1050), 24.0).unwrap();

        assert_eq!(plan.label, "1001-1050");
        assert_eq!(plan.representative_frame, 1025);
        assert!((plan.start_seconds - 1001.0 / 24.0).abs() < 1e-9);
        assert!((plan.end_seconds - 1050.0 / 24.0).abs() < 1e-9);
        assert!(plan.end_seconds >= plan.start_seconds);
        assert_eq!(plan.timecode_range(), "00:00:41:17 - 00:00:43:18");
        assert_eq!(plan.output_stem, "file1_1001-1050");
    }

    #[test]
    fn ntsc_timing_stays_within_a_frame() {
        let rate = 24000.0 / 1001.0;
        let plan = plan("/mnt/file1", FrameRange::new(1007, 1055), rate).unwrap();

        assert_eq!(plan.start_timecode.to_string(), "00:00:42:00");
        assert!((plan.start_seconds - 1007.0 / rate).abs() < 1.0 / rate);
        assert!((plan.end_seconds - 1055.0 / rate).abs() < 1.0 / rate);
    }

    #[test]
    fn midpoint_floors() {
        let plan = plan("/l", FrameRange::new(10, 13), 25.0).unwrap();
        assert_eq!(plan.representative_frame, 11);
    }

    #[test]
    fn rejects_inverted_range() {
        let err = plan("/l", FrameRange::new(10, 5), 24.0).unwrap_err();
        assert_eq!(err, PlanError::InvalidRange { start: 10, end: 5 });
    }

    #[test]
    fn rejects_invalid_rate() {
        let err = plan("/l", FrameRange::single(1), 0.0).unwrap_err();
        assert!(matches!(err, PlanError::Timecode(TimecodeError::InvalidRate(_))));
    }

    #[test]
    fn output_stem_sanitizes_name() {
        assert_eq!(output_stem("/mnt/a b/shot 01.mov", "5"), "shot_01_5");
        assert_eq!(output_stem("/mnt/plain", "1-2"), "plain_1-2");
        assert_eq!(output_stem("/mnt/dir/", "7"), "segment_7");
    }

    #[test]
    fn claim_suffixes_collisions() {
        let names = OutputNames::new();
        assert_eq!(names.claim("file1_5"), "file1_5");
        assert_eq!(names.claim("file1_5"), "file1_5_2");
        assert_eq!(names.claim("file1_5"), "file1_5_3");
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn claim_is_unique_across_threads() {
        let names = Arc::new(OutputNames::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let names = Arc::clone(&names);
                thread::spawn(move || (0..10).map(|_| names.claim("x")).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 80);
    }
}
