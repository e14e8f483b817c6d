use anyhow::Result;
use std::io::Write;

use crate::report::MigrationReport;

/// Writes the report as a single JSON document followed by a newline.
pub fn export_report(report: &MigrationReport, pretty: bool, output: &mut dyn Write) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *output, report)?;
    } else {
        serde_json::to_writer(&mut *output, report)?;
    }
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
