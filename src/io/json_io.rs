use std::path::Path;

use crate::analysis::IndexReport;
use crate::error::IndexError;

/// Write the full index report to a JSON file.
pub fn write_report_json(
    report: &IndexReport,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), IndexError> {
    let content = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}

/// Read an index report from a JSON file.
pub fn read_report_json(path: impl AsRef<Path>) -> Result<IndexReport, IndexError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let report: IndexReport = serde_json::from_str(&content)?;
    Ok(report)
}
