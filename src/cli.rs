//! Command-line interface definitions and argument parsing

use clap::Parser;

/// Customer segmentation CLI using quartile-based RFM scoring
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV of per-customer RFM aggregates
    #[arg(short, long)]
    pub input: String,

    /// Path for the output CSV of customer segments
    #[arg(short, long)]
    pub output: String,

    /// Dump the full enriched table to log.csv
    #[arg(short, long)]
    pub log: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
