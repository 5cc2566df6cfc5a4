//! reelcheck core - reconciliation of scan records against canonical locations.
//!
//! This crate contains all business logic with zero CLI dependencies:
//! frame-range consolidation, timecode arithmetic, extraction planning and
//! the review pipeline, plus the ingestion, storage, media-tool, upload and
//! report collaborators that feed and consume it.

pub mod config;
pub mod ingest;
pub mod logging;
pub mod matching;
pub mod media;
pub mod models;
pub mod orchestrator;
pub mod planning;
pub mod ranges;
pub mod report;
pub mod store;
pub mod timecode;
pub mod upload;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
