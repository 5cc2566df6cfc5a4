//! JSON file store persisted in a directory.
//!
//! Layout:
//! - `locations.json` - the current location set
//! - `scans.json` - all scan records in insertion order

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{LocationSet, ScanRecord};

const STORE_VERSION: u32 = 1;
const LOCATIONS_FILE: &str = "locations.json";
const SCANS_FILE: &str = "scans.json";

/// Persistent locations document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LocationsDoc {
    version: u32,
    set: LocationSet,
}

/// Persistent scans document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScansDoc {
    version: u32,
    records: Vec<ScanRecord>,
}

/// Record store backed by JSON files in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a store in `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| StoreError::io(format!("creating {}", dir.display()), e))?;
        Ok(Self { dir })
    }

    /// Directory holding the store files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_doc<T: DeserializeOwned>(&self, name: &str) -> StoreResult<Option<T>> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| StoreError::io(format!("reading {}", path.display()), e))?;
        let doc = serde_json::from_str(&content).map_err(|e| StoreError::json(name, e))?;
        Ok(Some(doc))
    }

    /// Write a document atomically (temp file, then rename).
    fn write_doc<T: Serialize>(&self, name: &str, doc: &T) -> StoreResult<()> {
        let path = self.dir.join(name);
        let temp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(doc).map_err(|e| StoreError::json(name, e))?;

        {
            let mut file = fs::File::create(&temp_path)
                .map_err(|e| StoreError::io(format!("creating {}", temp_path.display()), e))?;
            file.write_all(content.as_bytes())
                .and_then(|_| file.sync_all())
                .map_err(|e| StoreError::io(format!("writing {}", temp_path.display()), e))?;
        }

        fs::rename(&temp_path, &path)
            .map_err(|e| StoreError::io(format!("replacing {}", path.display()), e))
    }

    fn remove_if_exists(&self, name: &str) -> StoreResult<()> {
        let path = self.dir.join(name);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| StoreError::io(format!("removing {}", path.display()), e))?;
        }
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn save_location_set(&mut self, set: &LocationSet) -> StoreResult<()> {
        let doc = LocationsDoc {
            version: STORE_VERSION,
            set: set.clone(),
        };
        self.write_doc(LOCATIONS_FILE, &doc)?;
        tracing::info!("Stored location set with {} locations", set.len());
        Ok(())
    }

    fn append_scan_records(&mut self, records: &[ScanRecord]) -> StoreResult<()> {
        let mut doc = self.read_doc::<ScansDoc>(SCANS_FILE)?.unwrap_or(ScansDoc {
            version: STORE_VERSION,
            records: Vec::new(),
        });
        doc.records.extend_from_slice(records);
        self.write_doc(SCANS_FILE, &doc)?;
        tracing::info!(
            "Stored {} scan records ({} total)",
            records.len(),
            doc.records.len()
        );
        Ok(())
    }

    fn location_set(&self) -> StoreResult<Option<LocationSet>> {
        Ok(self.read_doc::<LocationsDoc>(LOCATIONS_FILE)?.map(|d| d.set))
    }

    fn scan_records(&self) -> StoreResult<Vec<ScanRecord>> {
        Ok(self
            .read_doc::<ScansDoc>(SCANS_FILE)?
            .map(|d| d.records)
            .unwrap_or_default())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.remove_if_exists(LOCATIONS_FILE)?;
        self.remove_if_exists(SCANS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_set() -> LocationSet {
        LocationSet::new(
            "Joe",
            "John",
            "Dirtfixing",
            "notes",
            vec!["/mnt/a/file1".to_string()],
        )
    }

    #[test]
    fn empty_store_reads_nothing() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("store")).unwrap();

        assert!(store.location_set().unwrap().is_none());
        assert!(store.scan_records().unwrap().is_empty());
    }

    #[test]
    fn persists_across_instances() {
        let dir = tempdir().unwrap();
        {
            let mut store = JsonFileStore::open(dir.path()).unwrap();
            store.save_location_set(&sample_set()).unwrap();
            store
                .append_scan_records(&[ScanRecord::new("/s/file1", vec![1, 2])])
                .unwrap();
            store
                .append_scan_records(&[ScanRecord::new("/s/file2", vec![9])])
                .unwrap();
        }

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.location_set().unwrap(), Some(sample_set()));
        let scans = store.scan_records().unwrap();
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[1].path, "/s/file2");
    }

    #[test]
    fn clear_removes_files() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        store.save_location_set(&sample_set()).unwrap();
        store.clear().unwrap();

        assert!(!dir.path().join(LOCATIONS_FILE).exists());
        assert!(store.location_set().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SCANS_FILE), "not json").unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        assert!(matches!(
            store.scan_records(),
            Err(StoreError::Json { .. })
        ));
    }
}
