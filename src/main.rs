//! RfmSeg: customer segmentation CLI using quartile-based RFM scoring
//!
//! This is the main entrypoint that orchestrates data loading, scoring and
//! output writing.

use anyhow::Result;
use clap::Parser;
use rfmseg::data::DIAGNOSTIC_PATH;
use rfmseg::{load_table, score_customers, write_diagnostic, write_segments, Args};
use std::time::Instant;

fn main() -> Result<()> {
    let args = Args::parse();

    println!("---------------------------------------------");
    println!(" Calculating RFM segmentation");
    println!("---------------------------------------------");

    let start_time = Instant::now();

    if args.verbose {
        println!("\nLoading customer data from: {}", args.input);
    }
    let table = load_table(&args.input)?;
    if args.verbose {
        println!("Loaded {} customer rows", table.records.len());
    }

    let scored = score_customers(&table.records)?;
    if args.verbose {
        println!("Scored {} customers", scored.len());
    }

    if args.log {
        write_diagnostic(&table, &scored, DIAGNOSTIC_PATH)?;
        if args.verbose {
            println!("Diagnostic table written to {DIAGNOSTIC_PATH}");
        }
    }

    write_segments(&table, &scored, &args.output)?;

    if args.verbose {
        println!(
            "Total processing time: {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
    }

    println!();
    println!("DONE! Check {}", args.output);

    Ok(())
}
