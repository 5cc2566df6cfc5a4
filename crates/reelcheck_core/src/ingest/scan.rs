//! Scan file parsing.
//!
//! Each non-blank line is `<path> <frame-or-sentinel>*`, separated by
//! whitespace.

use std::fs;
use std::path::Path;

use super::{IngestError, IngestResult};
use crate::models::ScanRecord;

/// Tokens the scanning tool writes for frames it could not process.
pub const SENTINEL_TOKENS: [&str; 2] = ["<err>", "<null>"];

/// Parse a single scan line. Blank lines yield `None`.
///
/// `line_no` is 1-based and only used for error context.
pub fn parse_scan_line(line: &str, line_no: usize) -> IngestResult<Option<ScanRecord>> {
    let mut tokens = line.split_whitespace();
    let Some(path) = tokens.next() else {
        return Ok(None);
    };

    let mut frames = Vec::new();
    for token in tokens {
        if SENTINEL_TOKENS.contains(&token) {
            continue;
        }
        let invalid = || IngestError::InvalidFrameToken {
            line: line_no,
            token: token.to_string(),
        };
        // ASCII digits only, no sign
        if !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let frame = token.parse::<u64>().map_err(|_| invalid())?;
        frames.push(frame);
    }

    Ok(Some(ScanRecord::new(path, frames)))
}

/// Parse scan file contents into records, one per non-blank line.
pub fn parse_scan_str(content: &str) -> IngestResult<Vec<ScanRecord>> {
    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(record) = parse_scan_line(line, idx + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Read and parse a scan file.
pub fn parse_scan_file(path: &Path) -> IngestResult<Vec<ScanRecord>> {
    let content = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_scan_str(&content)?;
    tracing::debug!("Parsed {} scan records from {}", records.len(), path.display());
    Ok(records)
}
