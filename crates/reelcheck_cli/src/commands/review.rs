use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _};
use reelcheck_core::config::Settings;
use reelcheck_core::logging::{LogConfig, RunLogger};
use reelcheck_core::media::{FfmpegTools, MediaInfo};
use reelcheck_core::orchestrator::{run_review, Context, RunOptions};
use reelcheck_core::report::{JsonReportWriter, Report, ReportWriter, TsvReportWriter};
use reelcheck_core::store::RecordStore;
use reelcheck_core::upload::{Credentials, FrameIoUploader};
use tracing::{debug, info};

use super::ReviewArgs;

/// Run name derived from the media file: its stem, or `review`.
pub fn run_name(media: &Path) -> String {
    media
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "review".to_string())
}

/// Where the report for `args` goes.
pub fn output_dir(settings: &Settings, args: &ReviewArgs) -> PathBuf {
    args.output.clone().unwrap_or_else(|| {
        PathBuf::from(&settings.paths.output_folder).join(run_name(&args.media))
    })
}

/// Review the records in `store` against `args.media` and write the report.
///
/// `on_context` sees the context before the run starts, which is where the
/// caller hooks up cancellation. A cancelled run is an error.
pub fn review_handler(
    settings: &Settings,
    store: &dyn RecordStore,
    args: &ReviewArgs,
    on_context: impl FnOnce(&Context) -> anyhow::Result<()>,
) -> anyhow::Result<(PathBuf, Report)> {
    let locations = store
        .location_set()
        .context("Failed to read the location set")?
        .context("No location set imported; run `reelcheck import-locations` first")?;
    let scans = store
        .scan_records()
        .context("Failed to read scan records")?;

    let name = run_name(&args.media);
    let work_dir = PathBuf::from(&settings.paths.work_folder).join(&name);
    let tools = FfmpegTools::from_settings(&settings.media, work_dir.join("segments"));
    if !tools.is_available() {
        bail!(
            "ffmpeg/ffprobe not found (looked for '{}' and '{}')",
            settings.media.ffmpeg_path,
            settings.media.ffprobe_path
        );
    }

    let mut options = RunOptions::from_settings(settings);
    if let Some(workers) = args.workers {
        options.workers = workers;
    }

    let media = MediaInfo::probe(&tools, &args.media, options.tool_timeout)
        .with_context(|| format!("Failed to probe {}", args.media.display()))?;
    debug!("Segments go to {}", tools.segment_dir().display());

    let logger = RunLogger::new(
        &name,
        PathBuf::from(&settings.paths.logs_folder),
        LogConfig::from(&settings.logging),
        None,
    )
    .context("Failed to create the run log")?;
    if let Some(path) = logger.log_path() {
        info!("Run log: {}", path.display());
    }
    let logger = Arc::new(logger);

    let mut ctx = Context::new(&name, locations, scans, media, Arc::new(tools), logger.clone())
        .with_options(options);

    if args.upload {
        let credentials = Credentials::from_settings(&settings.upload)
            .context("Upload requested but no credentials are available")?;
        let uploader = FrameIoUploader::from_settings(&settings.upload)
            .context("Failed to set up the upload client")?;
        info!("Uploading segments to {}", uploader.endpoint());
        ctx = ctx.with_uploader(Arc::new(uploader), credentials);
    }

    on_context(&ctx)?;

    let report = run_review(&ctx, args.upload).context("Review run failed")?;

    let dir = output_dir(settings, args);
    let path = if args.tsv {
        TsvReportWriter.write(&report, &dir)
    } else {
        JsonReportWriter.write(&report, &dir)
    }
    .with_context(|| format!("Failed to write the report to {}", dir.display()))?;

    logger.section("Summary");
    logger.info(&report.summary.render_text());
    logger.close();

    Ok((path, report))
}
