use std::io::Write;
use std::path::Path;

use crate::analysis::IndexReport;
use crate::error::IndexError;
use crate::models::SeriesPoint;

/// Write historical and projected emissions as `time_index,value,kind` rows.
pub fn write_series_csv(report: &IndexReport, path: impl AsRef<Path>) -> Result<(), IndexError> {
    let file = std::fs::File::create(path.as_ref())?;
    write_series(report, file)
}

/// Write the series CSV to an arbitrary writer.
pub fn write_series<W: Write>(report: &IndexReport, writer: W) -> Result<(), IndexError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in report.combined_series() {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a series CSV previously written by [`write_series_csv`].
pub fn read_series_csv(path: impl AsRef<Path>) -> Result<Vec<SeriesPoint>, IndexError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let mut points = Vec::new();
    for result in rdr.deserialize() {
        let point: SeriesPoint = result?;
        points.push(point);
    }
    Ok(points)
}
