use colored::{ColoredString, Colorize};

use crate::application::services::scan_cycle::ScanReport;

pub fn print_section_header(title: &str) {
    println!("{}", title.bold().cyan());
    let display_width = title.chars().count();
    println!("{}", "─".repeat(display_width).cyan());
}

fn colorize_count(value: usize, alarming: bool) -> ColoredString {
    let text = value.to_string();
    if value == 0 {
        text.dimmed()
    } else if alarming {
        text.red().bold()
    } else {
        text.green()
    }
}

/// Rows of the human-readable report, label then colored value.
#[must_use]
pub fn report_rows(report: &ScanReport) -> Vec<(&'static str, ColoredString)> {
    vec![
        ("Pages", report.pages.to_string().normal()),
        ("Keys seen", report.keys_seen.to_string().normal()),
        ("Duplicates skipped", colorize_count(report.duplicates_skipped, false)),
        ("Evaluated", report.evaluated.to_string().normal()),
        ("Healthy", colorize_count(report.healthy, false)),
        ("Deferred", colorize_count(report.deferred, true)),
        ("Evicted", colorize_count(report.evicted, true)),
        ("Deliveries ok", colorize_count(report.deliveries_ok, false)),
        ("Deliveries failed", colorize_count(report.deliveries_failed, true)),
    ]
}

pub fn print_report(report: &ScanReport) {
    print_section_header("Deposit health scan");
    println!(
        "{}",
        format!("Started {}", report.started_at.format("%Y-%m-%d %H:%M:%S UTC")).dimmed()
    );
    for (label, value) in report_rows(report) {
        println!("  {label:<20} {value}");
    }
}
