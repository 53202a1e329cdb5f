mod indicator;
mod scenario;
mod scores;
mod series;

pub use indicator::Indicator;
pub use scenario::{DeclineRateInputs, PerCapitaInputs, ProjectionInputs, Scenario};
pub use scores::ScoreSet;
pub use series::{Projection, SeriesKind, SeriesPoint, TimeSeries};
