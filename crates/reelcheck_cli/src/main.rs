//! reelcheck command-line front end.
//!
//! Imports scan and location files into the record store, then builds
//! review reports (and optionally uploads segments) for a video.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use directories::ProjectDirs;
use reelcheck_core::config::ConfigManager;
use reelcheck_core::logging::init_tracing;
use reelcheck_core::orchestrator::Context;
use reelcheck_core::report::Report;
use reelcheck_core::store::MemoryStore;
use tracing::{info, warn};

use crate::commands::{
    ingest::{import_locations_handler, import_scan_handler, open_store},
    init::init_config_handler,
    review::review_handler,
    Commands,
    ReelcheckCli,
};

mod commands;

pub const CONFIG_FILE_NAME: &str = "reelcheck.toml";

fn main() -> anyhow::Result<()> {
    run()
}

fn default_config_path() -> PathBuf {
    ProjectDirs::from("", "", "reelcheck")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Cancel the run on Ctrl-C. In-flight tool calls finish, new ones don't start.
fn install_interrupt_handler(ctx: &Context) -> anyhow::Result<()> {
    let cancel = ctx.cancel_handle();
    ctrlc::set_handler(move || {
        warn!("Interrupted, stopping after the current items");
        cancel.cancel();
    })
    .context("Failed to install the Ctrl-C handler")
}

fn print_report(path: &Path, report: &Report) {
    println!("Report written to {} ({} rows)", path.display(), report.rows.len());
    let summary = report.summary.render_text();
    if !summary.is_empty() {
        println!("{}", summary.trim_end());
    }
}

fn run() -> anyhow::Result<()> {
    let cli = ReelcheckCli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    if let Commands::InitConfig { force } = cli.command {
        let _guard = init_tracing(Default::default(), cli.log_file.as_deref())
            .context("Failed to initialise logging")?;
        if init_config_handler(&config_path, force)? {
            println!("Wrote {}", config_path.display());
        } else {
            println!("{} already exists", config_path.display());
        }
        return Ok(());
    }

    let mut manager = ConfigManager::new(&config_path);
    manager
        .load_or_create()
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    let mut level = manager.settings().logging.level;
    for _ in 0..cli.verbose {
        level = level.more_verbose();
    }
    let _guard =
        init_tracing(level, cli.log_file.as_deref()).context("Failed to initialise logging")?;
    info!("Using config {}", manager.path().display());

    manager
        .ensure_dirs_exist()
        .context("Failed to create working directories")?;
    let settings = manager.settings();

    match cli.command {
        Commands::ImportScan { file } => {
            let mut store = open_store(&manager.store_folder())?;
            let count = import_scan_handler(&mut store, &file)?;
            println!("Imported {} scan records", count);
        }
        Commands::ImportLocations { file } => {
            let mut store = open_store(&manager.store_folder())?;
            let count = import_locations_handler(&mut store, &file)?;
            println!("Imported {} locations", count);
        }
        Commands::Report { review } => {
            let store = open_store(&manager.store_folder())?;
            let (path, report) =
                review_handler(settings, &store, &review, install_interrupt_handler)?;
            print_report(&path, &report);
        }
        Commands::Run {
            scan,
            locations,
            review,
        } => {
            let mut store = MemoryStore::new();
            import_locations_handler(&mut store, &locations)?;
            import_scan_handler(&mut store, &scan)?;
            let (path, report) =
                review_handler(settings, &store, &review, install_interrupt_handler)?;
            print_report(&path, &report);
        }
        Commands::InitConfig { .. } => {}
    }

    Ok(())
}
