use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::config::StallSetting;
use crate::logging::LogDestination;

/// Collect every row of a virtualized web table into a JSON file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// RON config file; `harvester.ron` in the working directory is used when present
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Page that hosts the table
    #[arg(long, env = "TARGET_URL")]
    pub url: Option<String>,

    /// Where to write the JSON array of records
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Where to write the run manifest
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Do not write a manifest
    #[arg(long, conflicts_with = "manifest")]
    pub no_manifest: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Browser profile directory, reused between runs to keep the session
    #[arg(long)]
    pub profile_dir: Option<PathBuf>,

    /// Pause after each round, in milliseconds
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Maximum number of rounds
    #[arg(long)]
    pub safety_ceiling: Option<u64>,

    /// Rounds at the bottom without new rows before the table counts as exhausted
    #[arg(long)]
    pub no_progress_threshold: Option<u32>,

    /// How a round that could not scroll affects the exhaustion counter
    #[arg(long, value_enum)]
    pub stall_policy: Option<StallSetting>,

    /// Expected row count when the page shows no "showing k of N" banner
    #[arg(long)]
    pub count_hint: Option<u64>,

    /// Skip table detection and use this selector
    #[arg(long)]
    pub table_selector: Option<String>,

    /// Skip the configured wizard steps
    #[arg(long)]
    pub skip_wizard: bool,

    /// Log destination
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,

    /// Log debug output, including per-round detail with -vv
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CliOptions {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}
