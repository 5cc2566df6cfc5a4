use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod ingest;
pub mod init;
pub mod review;

#[derive(Parser)]
#[command(
    name = "reelcheck",
    about = "Reconcile film-scan frame reports against canonical locations and build review \
             reports.",
    version
)]
pub struct ReelcheckCli {
    #[command(subcommand)]
    pub command: Commands,
    /// Config file location. Defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Also write log events to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
    /// More verbose logging; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a scan file and append its records to the store
    ImportScan { file: PathBuf },
    /// Parse a location file and replace the stored location set
    ImportLocations { file: PathBuf },
    /// Build a review report from the stored records
    Report {
        #[command(flatten)]
        review: ReviewArgs,
    },
    /// One-shot review straight from a scan file and a location file
    Run {
        #[arg(long)]
        scan: PathBuf,
        #[arg(long)]
        locations: PathBuf,
        #[command(flatten)]
        review: ReviewArgs,
    },
    /// Write the default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Options shared by `report` and `run`.
#[derive(clap::Args, Debug, Clone)]
pub struct ReviewArgs {
    /// Video the frames are rendered from
    #[arg(long)]
    pub media: PathBuf,
    /// Report directory. Defaults to `<output folder>/<media stem>`.
    #[arg(long, short('o'))]
    pub output: Option<PathBuf>,
    #[arg(long, short('w'))]
    pub workers: Option<usize>,
    /// Extract and upload a segment for every range
    #[arg(long)]
    pub upload: bool,
    /// Write `report.tsv` instead of `report.json`
    #[arg(long)]
    pub tsv: bool,
}
