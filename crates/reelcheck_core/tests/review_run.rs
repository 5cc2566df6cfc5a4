//! End-to-end review run: ingest, store, pipeline and report writers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reelcheck_core::ingest::{parse_location_str, parse_scan_str};
use reelcheck_core::logging::{LogConfig, RunLogger};
use reelcheck_core::media::{FrameRate, MediaInfo, MediaRenderer, MediaResult};
use reelcheck_core::orchestrator::{run_review, Context, RunOptions};
use reelcheck_core::report::{JsonReportWriter, ReportWriter, TsvReportWriter};
use reelcheck_core::store::{JsonFileStore, RecordStore};

const LOCATIONS: &str = "\
Dirt report

Producer: Joe Schmoe
Operator: John Doe
Job: Dirtfixing
Locations:
/mnt/show/seg1/L1.dpx
/mnt/show/seg1/L2.dpx
Notes:
Please clean files
";

const SCANS: &str = "\
/scans/show/seg1/L1.dpx 10 <err> 1 2 3
/scans/show/seg1/unknown.dpx 4
";

struct StillRenderer;

impl MediaRenderer for StillRenderer {
    fn thumbnail(&self, _path: &Path, frame: u64, _timeout: Duration) -> MediaResult<Vec<u8>> {
        Ok(format!("frame {}", frame).into_bytes())
    }

    fn extract_segment(
        &self,
        _path: &Path,
        _start_seconds: f64,
        _end_seconds: f64,
        output_stem: &str,
        _timeout: Duration,
    ) -> MediaResult<PathBuf> {
        Ok(PathBuf::from(format!("{}.mp4", output_stem)))
    }
}

#[test]
fn review_run_from_ingested_files() {
    let dir = tempfile::tempdir().unwrap();

    let mut store = JsonFileStore::open(dir.path().join("store")).unwrap();
    store
        .save_location_set(&parse_location_str(LOCATIONS).unwrap())
        .unwrap();
    store
        .append_scan_records(&parse_scan_str(SCANS).unwrap())
        .unwrap();

    let locations = store.location_set().unwrap().unwrap();
    let scans = store.scan_records().unwrap();
    assert_eq!(scans.len(), 2);

    let media = MediaInfo::new("/media/reel.mov", 60.0, FrameRate::new(24, 1));
    let logger = Arc::new(RunLogger::detached("e2e", LogConfig::default()));
    let ctx = Context::new("e2e", locations, scans, media, Arc::new(StillRenderer), logger)
        .with_options(RunOptions {
            workers: 2,
            ..RunOptions::default()
        });

    let report = run_review(&ctx, false).unwrap();

    let labels: Vec<_> = report.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["1-3", "10"]);
    assert_eq!(report.rows[0].timecode_range, "00:00:00:01 - 00:00:00:03");
    assert_eq!(report.rows_for("/mnt/show/seg1/L2.dpx").count(), 0);
    assert_eq!(
        report.summary.locations_without_scans,
        vec!["/mnt/show/seg1/L2.dpx"]
    );
    assert_eq!(
        report.summary.unmatched_scans,
        vec!["/scans/show/seg1/unknown.dpx"]
    );

    let out = dir.path().join("out");
    let tsv = TsvReportWriter.write(&report, &out).unwrap();
    let text = fs::read_to_string(tsv).unwrap();
    assert!(text.contains("Joe Schmoe\tJohn Doe\tDirtfixing\tPlease clean files\n"));
    assert!(text.contains(
        "/mnt/show/seg1/L1.dpx\t1-3\t00:00:00:01 - 00:00:00:03\tthumbnails/L1_1-3.png\n"
    ));
    assert_eq!(
        fs::read(out.join("thumbnails").join("L1_10.png")).unwrap(),
        b"frame 10"
    );

    let json = JsonReportWriter.write(&report, &out).unwrap();
    assert!(fs::read_to_string(json).unwrap().contains("\"label\": \"10\""));
}
