//! Strict parsers for the scan file and the location file.
//!
//! Both parsers are all-or-nothing: the first malformed line aborts the
//! file with a specific [`IngestError`] and no partial data is returned.
//!
//! # Example
//!
//! ```
//! use reelcheck_core::ingest::parse_scan_line;
//!
//! let record = parse_scan_line("/show/file1 100 <err> 101 <null> 103", 1)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(record.frames, vec![100, 101, 103]);
//! ```

mod locations;
mod scan;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use locations::{parse_location_file, parse_location_str, MIN_LOCATION_LINES};
pub use scan::{parse_scan_file, parse_scan_line, parse_scan_str, SENTINEL_TOKENS};

/// Fatal parse errors. Any of these aborts ingestion of its source file.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Location file has fewer non-empty lines than the fixed layout needs.
    #[error("Location file has {found} non-empty lines, at least {required} required")]
    TooFewLines { found: usize, required: usize },

    /// A fixed header line does not carry the expected `Key: value`.
    #[error("Line {line}: expected '{field}: <value>', found '{text}'")]
    MissingField {
        line: usize,
        field: &'static str,
        text: String,
    },

    /// Scan line contains a token that is neither a frame number nor a sentinel.
    #[error("Line {line}: invalid frame token '{token}'")]
    InvalidFrameToken { line: usize, token: String },

    /// Failed to read the source file.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;
