//! Data models for reelcheck.
//!
//! This module contains the core data structures passed between stages:
//! - Ingested records (scan records, location sets)
//! - Frame ranges and extraction plans

mod frames;
mod records;

// Re-export all public types
pub use frames::{ExtractionPlan, FrameRange};
pub use records::{LocationSet, ScanRecord};

/// Final path segment of a `/`-separated path.
///
/// Used as the identity key when matching scan paths to canonical locations.
pub fn final_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
