pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod visualization;

pub use analysis::{Analyzer, IndexReport};
pub use config::IndexConfig;
pub use error::IndexError;
pub use io::{CsvFormat, JsonFormat, ReportWriter};
pub use models::{Indicator, Projection, ScoreSet, TimeSeries};
