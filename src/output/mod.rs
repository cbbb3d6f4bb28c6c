//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan reports.
//! All of them write to stdout; diagnostics go to stderr through `tracing`.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{print_scan_header, print_warning, write_count, write_plain};

use crate::cli::OutputFormat;
use crate::error::CliResult;
use crate::report::ScanReport;
use std::io;

/// Format and print the report according to the specified format.
pub fn print_report(report: &ScanReport, format: OutputFormat, quiet: bool) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Plain if quiet => write_count(&mut out, report)?,
        OutputFormat::Plain => write_plain(&mut out, report)?,
        OutputFormat::Json => write_json(&mut out, report)?,
        OutputFormat::Csv => write_csv(&mut out, report)?,
    }

    Ok(())
}
