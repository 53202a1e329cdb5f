mod csv_io;
mod json_io;

use std::path::Path;

use crate::analysis::IndexReport;
use crate::error::IndexError;

pub use csv_io::{read_series_csv, write_series, write_series_csv};
pub use json_io::{read_report_json, write_report_json};

/// Trait for exporting an index report to a file.
pub trait ReportWriter {
    fn write(&self, report: &IndexReport, path: &Path) -> Result<(), IndexError>;
}

/// CSV export of the historical and projected series.
pub struct CsvFormat;

impl ReportWriter for CsvFormat {
    fn write(&self, report: &IndexReport, path: &Path) -> Result<(), IndexError> {
        write_series_csv(report, path)
    }
}

/// JSON export of the full report.
#[derive(Default)]
pub struct JsonFormat {
    pub pretty: bool,
}

impl ReportWriter for JsonFormat {
    fn write(&self, report: &IndexReport, path: &Path) -> Result<(), IndexError> {
        write_report_json(report, path, self.pretty)
    }
}

/// Pick a writer from the file extension (`.json` or `.csv`).
pub fn writer_for_path(path: &Path, pretty: bool) -> Result<Box<dyn ReportWriter>, IndexError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "json" => Ok(Box::new(JsonFormat { pretty })),
        "csv" => Ok(Box::new(CsvFormat)),
        _ => Err(IndexError::ValidationError(format!(
            "Unsupported export format: .{ext}. Use .json or .csv"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::config::IndexConfig;

    #[test]
    fn test_csv_trait_write() {
        let report = Analyzer::new(&IndexConfig::default()).run().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.csv");

        let writer: &dyn ReportWriter = &CsvFormat;
        writer.write(&report, &path).unwrap();

        assert_eq!(read_series_csv(&path).unwrap().len(), 24);
    }

    #[test]
    fn test_json_trait_write() {
        let report = Analyzer::new(&IndexConfig::default()).run().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let writer: &dyn ReportWriter = &JsonFormat { pretty: true };
        writer.write(&report, &path).unwrap();

        let loaded = read_report_json(&path).unwrap();
        assert_eq!(loaded.scores.len(), 3);
    }

    #[test]
    fn test_writer_for_path() {
        assert!(writer_for_path(Path::new("out.JSON"), false).is_ok());
        assert!(writer_for_path(Path::new("out.csv"), false).is_ok());
        assert!(writer_for_path(Path::new("out.xlsx"), false).is_err());
        assert!(writer_for_path(Path::new("out"), false).is_err());
    }

    #[test]
    fn test_json_format_default() {
        let fmt = JsonFormat::default();
        assert!(!fmt.pretty);
    }
}
