use std::path::Path;

use anyhow::Context as _;
use reelcheck_core::ingest::{parse_location_file, parse_scan_file};
use reelcheck_core::store::{JsonFileStore, RecordStore};
use tracing::info;

/// Parse `file` and append its scan records to `store`.
pub fn import_scan_handler(store: &mut dyn RecordStore, file: &Path) -> anyhow::Result<usize> {
    let records = parse_scan_file(file)
        .with_context(|| format!("Failed to import scan file {}", file.display()))?;
    store
        .append_scan_records(&records)
        .context("Failed to store scan records")?;

    info!("Imported {} scan records from {}", records.len(), file.display());
    Ok(records.len())
}

/// Parse `file` and make it the stored location set.
pub fn import_locations_handler(
    store: &mut dyn RecordStore,
    file: &Path,
) -> anyhow::Result<usize> {
    let set = parse_location_file(file)
        .with_context(|| format!("Failed to import location file {}", file.display()))?;
    store
        .save_location_set(&set)
        .context("Failed to store location set")?;

    info!(
        "Imported {} locations for job '{}' from {}",
        set.len(),
        set.job,
        file.display()
    );
    Ok(set.len())
}

pub fn open_store(dir: &Path) -> anyhow::Result<JsonFileStore> {
    JsonFileStore::open(dir).with_context(|| format!("Failed to open store {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use reelcheck_core::store::MemoryStore;

    #[test]
    fn imports_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let scan = dir.path().join("scan.txt");
        let locations = dir.path().join("locations.txt");
        fs::write(&scan, "/scan/L1.dpx 1 2 <null> 3\n\n/scan/L2.dpx 9\n").unwrap();
        fs::write(
            &locations,
            "Report\nProducer: P\nOperator: O\nJob: J\nLocations\n/mnt/L1.dpx\n\
             Notes\nNotes: none\n",
        )
        .unwrap();

        let mut store = MemoryStore::new();
        assert_eq!(import_scan_handler(&mut store, &scan).unwrap(), 2);
        assert_eq!(import_locations_handler(&mut store, &locations).unwrap(), 1);
        assert_eq!(store.scan_records().unwrap()[0].frames, vec![1, 2, 3]);
        assert_eq!(store.location_set().unwrap().unwrap().notes, "none");
    }

    #[test]
    fn malformed_scan_imports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let scan = dir.path().join("scan.txt");
        fs::write(&scan, "/scan/L1.dpx 1\n/scan/L2.dpx x\n").unwrap();

        let mut store = MemoryStore::new();
        assert!(import_scan_handler(&mut store, &scan).is_err());
        assert!(store.scan_records().unwrap().is_empty());
    }
}
