use anyhow::Context;
use colored::Colorize;

use crate::application::services::scan_cycle::ScanReport;
use crate::application::services::scanner::{Scanner, TickOutcome};
use crate::presentation::cli::formatters::report_fmt::print_report;

/// Runs exactly one scan cycle and prints its report.
///
/// # Errors
///
/// Returns an error if the key store fails mid-cycle or JSON serialization fails.
pub async fn run_scan(scanner: &Scanner, json: bool) -> anyhow::Result<()> {
    let outcome = scanner.tick().await.context("scan cycle failed")?;
    match outcome {
        TickOutcome::Completed(report) if json => print_report_json(&report)?,
        TickOutcome::Completed(report) => print_report(&report),
        TickOutcome::Skipped => println!("{}", "A scan is already running".yellow()),
    }
    Ok(())
}

fn print_report_json(report: &ScanReport) -> anyhow::Result<()> {
    let output = serde_json::to_string_pretty(report)?;
    println!("{output}");
    Ok(())
}
