//! In-memory record store for one-shot runs and tests.

use super::{RecordStore, StoreResult};
use crate::models::{LocationSet, ScanRecord};

/// Store that keeps records in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    locations: Option<LocationSet>,
    scans: Vec<ScanRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn save_location_set(&mut self, set: &LocationSet) -> StoreResult<()> {
        self.locations = Some(set.clone());
        Ok(())
    }

    fn append_scan_records(&mut self, records: &[ScanRecord]) -> StoreResult<()> {
        self.scans.extend_from_slice(records);
        Ok(())
    }

    fn location_set(&self) -> StoreResult<Option<LocationSet>> {
        Ok(self.locations.clone())
    }

    fn scan_records(&self) -> StoreResult<Vec<ScanRecord>> {
        Ok(self.scans.clone())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.locations = None;
        self.scans.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_locations_and_appends_scans() {
        let mut store = MemoryStore::new();
        store
            .save_location_set(&LocationSet::new("a", "b", "c", "d", vec![]))
            .unwrap();
        store
            .save_location_set(&LocationSet::new("x", "b", "c", "d", vec![]))
            .unwrap();
        store
            .append_scan_records(&[ScanRecord::new("/p1", vec![1])])
            .unwrap();
        store
            .append_scan_records(&[ScanRecord::new("/p2", vec![2])])
            .unwrap();

        assert_eq!(store.location_set().unwrap().unwrap().producer, "x");
        assert_eq!(store.scan_records().unwrap().len(), 2);

        store.clear().unwrap();
        assert!(store.location_set().unwrap().is_none());
        assert!(store.scan_records().unwrap().is_empty());
    }
}
