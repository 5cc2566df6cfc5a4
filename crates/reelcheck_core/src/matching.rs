//! Matching of scan-record paths to canonical locations.
//!
//! The matching key is the final path segment. When several canonical
//! locations share a final segment, the lexicographically first one wins
//! and the other candidates are reported alongside the match.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{final_segment, ScanRecord};

/// Result of matching one scan record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Index of the record in the input slice.
    pub record_index: usize,
    /// Path of the scan record.
    pub scan_path: String,
    /// Matched canonical location, or `None` when unmatched.
    pub location: Option<String>,
    /// Other candidates sharing the same final segment (ambiguous match).
    pub also_matched: Vec<String>,
}

impl MatchOutcome {
    /// Whether a canonical location was found.
    pub fn is_matched(&self) -> bool {
        self.location.is_some()
    }

    /// Whether more than one canonical location shared the final segment.
    pub fn is_ambiguous(&self) -> bool {
        !self.also_matched.is_empty()
    }
}

/// Index of canonical locations keyed by final path segment.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex<'a> {
    by_name: BTreeMap<&'a str, Vec<&'a str>>,
}

impl<'a> LocationIndex<'a> {
    /// Build an index over the given canonical locations.
    pub fn new(locations: &'a [String]) -> Self {
        let mut by_name: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for location in locations {
            by_name
                .entry(final_segment(location))
                .or_default()
                .push(location.as_str());
        }
        for candidates in by_name.values_mut() {
            candidates.sort_unstable();
            candidates.dedup();
        }
        Self { by_name }
    }

    /// Candidates for a final segment, lexicographically sorted.
    pub fn candidates(&self, name: &str) -> &[&'a str] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Match every scan record against the canonical locations.
///
/// Returns one outcome per record, in input order.
pub fn match_records(records: &[ScanRecord], locations: &[String]) -> Vec<MatchOutcome> {
    let index = LocationIndex::new(locations);

    records
        .iter()
        .enumerate()
        .map(|(record_index, record)| {
            let candidates = index.candidates(record.file_name());
            let location = candidates.first().map(|c| c.to_string());
            let also_matched: Vec<String> =
                candidates.iter().skip(1).map(|c| c.to_string()).collect();

            MatchOutcome {
                record_index,
                scan_path: record.path.clone(),
                location,
                also_matched,
            }
        })
        .collect()
}
