//! CSV output formatting.

use crate::report::ScanReport;
use std::io::Write;

/// Write a header row and one data row.
pub fn write_csv<W: Write>(out: W, report: &ScanReport) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record([
        "id",
        "backend",
        "endpoint",
        "namespace",
        "set",
        "records",
        "records_per_second",
        "started_at",
        "duration_ms",
    ])?;

    wtr.write_record([
        &report.id.to_string(),
        &report.backend,
        &report.endpoint,
        &report.namespace,
        &report.set,
        &report.records.to_string(),
        &report.records_per_second.to_string(),
        &report.started_at.to_rfc3339(),
        &report.duration_ms.to_string(),
    ])?;

    wtr.flush()?;
    Ok(())
}
