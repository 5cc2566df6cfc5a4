//! Record repository.
//!
//! Ingestion writes parsed records here and report runs read them back.
//! The repository is passed explicitly to whoever needs it; the pipeline
//! itself never holds one.
//!
//! # Example
//!
//! ```no_run
//! use reelcheck_core::store::{JsonFileStore, RecordStore};
//!
//! let mut store = JsonFileStore::open(".reelcheck/store").unwrap();
//! let records = store.scan_records().unwrap();
//! println!("{} scan records stored", records.len());
//! ```

mod json;
mod memory;

use std::io;

use thiserror::Error;

use crate::models::{LocationSet, ScanRecord};

pub use json::JsonFileStore;
pub use memory::MemoryStore;

/// Errors from record persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to (de)serialize {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a serialization error with context.
    pub fn json(what: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            what: what.into(),
            source,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Repository of ingested records.
pub trait RecordStore {
    /// Store the location set, replacing any previous one.
    fn save_location_set(&mut self, set: &LocationSet) -> StoreResult<()>;

    /// Append scan records after those already stored.
    fn append_scan_records(&mut self, records: &[ScanRecord]) -> StoreResult<()>;

    /// The stored location set, if any.
    fn location_set(&self) -> StoreResult<Option<LocationSet>>;

    /// All stored scan records in insertion order.
    fn scan_records(&self) -> StoreResult<Vec<ScanRecord>>;

    /// Remove everything.
    fn clear(&mut self) -> StoreResult<()>;
}
