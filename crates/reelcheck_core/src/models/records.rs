//! Ingested record types.

use serde::{Deserialize, Serialize};

/// Frame numbers reported as processed for one file by the scanning tool.
///
/// `frames` is a multiset: duplicates and arbitrary order are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Path as written by the scanning tool.
    pub path: String,
    /// Processed frame numbers (sentinels already removed).
    pub frames: Vec<u64>,
}

impl ScanRecord {
    /// Create a new scan record.
    pub fn new(path: impl Into<String>, frames: Vec<u64>) -> Self {
        Self {
            path: path.into(),
            frames,
        }
    }

    /// Final path segment used for matching.
    pub fn file_name(&self) -> &str {
        super::final_segment(&self.path)
    }
}

/// Canonical file locations and job metadata from production tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSet {
    pub producer: String,
    pub operator: String,
    pub job: String,
    pub notes: String,
    /// Canonical paths, unique by full path, in file order.
    pub locations: Vec<String>,
}

impl LocationSet {
    /// Create a location set, dropping repeated paths (first occurrence wins).
    pub fn new(
        producer: impl Into<String>,
        operator: impl Into<String>,
        job: impl Into<String>,
        notes: impl Into<String>,
        locations: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for location in locations {
            if !unique.contains(&location) {
                unique.push(location);
            }
        }

        Self {
            producer: producer.into(),
            operator: operator.into(),
            job: job.into(),
            notes: notes.into(),
            locations: unique,
        }
    }

    /// Number of canonical locations.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the set has no locations.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
