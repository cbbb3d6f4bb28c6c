//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::config::ScanConfig;
use crate::report::ScanReport;
use console::style;
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";

/// Write a styled summary of `report`.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                    {} Scan Results",
        style("aerocount").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Endpoint:").bold(), report.endpoint)?;
    writeln!(
        out,
        "  {} {}",
        style("Namespace:").bold(),
        report.namespace
    )?;
    writeln!(out, "  {} {}", style("Set:").bold(), display_set(&report.set))?;
    writeln!(out, "  {} {}", style("Backend:").bold(), report.backend)?;
    writeln!(
        out,
        "  {} {}",
        style("Run ID:").bold(),
        style(report.short_id()).dim()
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {} records in {:.2}s ({:.0} rec/s, limit {})",
        style("Statistics:").bold(),
        style(report.records).green().bold(),
        report.duration_ms as f64 / 1000.0,
        report.observed_rate(),
        display_limit(report.records_per_second)
    )?;

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Write only the count, for `--quiet` runs.
pub fn write_count<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    writeln!(out, "{}", report.records)
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(config: &ScanConfig, backend: &str) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("aerocount").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Endpoint: {} ({})",
        style("•").dim(),
        style(&config.endpoint).white().bold(),
        backend
    );
    println!(
        "{} Scanning {}.{}",
        style("•").dim(),
        style(&config.namespace).white().bold(),
        display_set(&config.set)
    );
    println!(
        "{} Throttle: {}",
        style("•").dim(),
        style(config.records_per_second).yellow()
    );
    println!();
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

fn display_set(set: &str) -> &str {
    if set.is_empty() {
        "<all sets>"
    } else {
        set
    }
}

fn display_limit(rps: u32) -> String {
    match rps {
        0 => "none".to_string(),
        n => format!("{}/s", n),
    }
}
