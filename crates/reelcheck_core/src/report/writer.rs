//! Report writers.
//!
//! Both writers put thumbnails under `<dir>/thumbnails/` and return the
//! path of the main report file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{Report, ReportError, ReportResult};

/// Subdirectory receiving thumbnail images.
pub const THUMBNAIL_DIR: &str = "thumbnails";

/// Something that can persist a [`Report`].
pub trait ReportWriter {
    /// Write `report` into `dir`, returning the main output file.
    fn write(&self, report: &Report, dir: &Path) -> ReportResult<PathBuf>;
}

fn write_thumbnails(report: &Report, dir: &Path) -> ReportResult<usize> {
    let thumb_dir = dir.join(THUMBNAIL_DIR);
    let mut written = 0;

    for thumbnail in report.rows.iter().filter_map(|r| r.thumbnail.as_ref()) {
        if written == 0 {
            fs::create_dir_all(&thumb_dir)
                .map_err(|e| ReportError::io(format!("creating {}", thumb_dir.display()), e))?;
        }
        let path = thumb_dir.join(&thumbnail.file_name);
        fs::write(&path, &thumbnail.png)
            .map_err(|e| ReportError::io(format!("writing {}", path.display()), e))?;
        written += 1;
    }

    Ok(written)
}

fn write_atomic(path: &Path, content: &[u8]) -> ReportResult<()> {
    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path)
            .map_err(|e| ReportError::io(format!("creating {}", temp_path.display()), e))?;
        file.write_all(content)
            .map_err(|e| ReportError::io(format!("writing {}", temp_path.display()), e))?;
    }
    fs::rename(&temp_path, path)
        .map_err(|e| ReportError::io(format!("replacing {}", path.display()), e))
}

/// Writes `report.json` plus thumbnail files.
#[derive(Debug, Clone, Default)]
pub struct JsonReportWriter;

impl ReportWriter for JsonReportWriter {
    fn write(&self, report: &Report, dir: &Path) -> ReportResult<PathBuf> {
        fs::create_dir_all(dir)
            .map_err(|e| ReportError::io(format!("creating {}", dir.display()), e))?;

        let thumbnails = write_thumbnails(report, dir)?;
        let path = dir.join("report.json");
        let content = serde_json::to_vec_pretty(report)?;
        write_atomic(&path, &content)?;

        tracing::info!(
            "Wrote {} ({} rows, {} thumbnails)",
            path.display(),
            report.rows.len(),
            thumbnails
        );
        Ok(path)
    }
}

/// Writes a tab-separated `report.tsv` plus thumbnail files.
///
/// Layout: a `Producer/Operator/Job/Notes` header block, a blank line, then
/// one `Location/Frames/Timecode/Thumbnail` line per row.
#[derive(Debug, Clone, Default)]
pub struct TsvReportWriter;

impl TsvReportWriter {
    /// Render the report as TSV text.
    pub fn render(report: &Report) -> String {
        let h = &report.header;
        let mut out = String::new();

        out.push_str("Producer\tOperator\tJob\tNotes\n");
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            clean(&h.producer),
            clean(&h.operator),
            clean(&h.job),
            clean(&h.notes)
        ));
        out.push('\n');
        out.push_str("Location\tFrames\tTimecode\tThumbnail\n");

        for row in &report.rows {
            let thumbnail = row
                .thumbnail
                .as_ref()
                .map(|t| format!("{}/{}", THUMBNAIL_DIR, t.file_name))
                .unwrap_or_default();
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\n",
                clean(&row.location),
                row.label,
                row.timecode_range,
                thumbnail
            ));
        }

        out
    }
}

impl ReportWriter for TsvReportWriter {
    fn write(&self, report: &Report, dir: &Path) -> ReportResult<PathBuf> {
        fs::create_dir_all(dir)
            .map_err(|e| ReportError::io(format!("creating {}", dir.display()), e))?;

        write_thumbnails(report, dir)?;
        let path = dir.join("report.tsv");
        write_atomic(&path, Self::render(report).as_bytes())?;

        tracing::info!("Wrote {} ({} rows)", path.display(), report.rows.len());
        Ok(path)
    }
}

/// Tabs and newlines would break the column layout.
fn clean(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
