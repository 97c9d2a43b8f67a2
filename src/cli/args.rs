use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser, Debug)]
#[clap(
    name = "monthcal",
    version,
    about = "Month calendar with per-day events"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory holding the event data
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Directory month exports are written to
    #[clap(long, value_parser)]
    pub export_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the monthcal application
    #[clap(subcommand)]
    pub command: Commands,
}
