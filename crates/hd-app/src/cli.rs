//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Hours tracking dashboard.
///
/// Shows a calendar-month table of worked hours with a live stopwatch
/// bound to today's row, a running monthly total, and a per-day hours
/// chart.
#[derive(Debug, Parser)]
#[command(name = "hd", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the month and settings files (overrides config).
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}
