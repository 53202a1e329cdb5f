use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Whether a point was observed or extrapolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Historical,
    Projected,
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesKind::Historical => write!(f, "historical"),
            SeriesKind::Projected => write!(f, "projected"),
        }
    }
}

/// One (time-index, value) pair of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time_index: usize,
    pub value: f64,
    pub kind: SeriesKind,
}

/// Historical observations at time indices 0, 1, 2, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct TimeSeries {
    values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series, rejecting empty or non-finite data.
    pub fn new(values: Vec<f64>) -> Result<Self, IndexError> {
        if values.is_empty() {
            return Err(IndexError::InsufficientData(
                "Time series has no observations".to_string(),
            ));
        }
        if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(IndexError::ValidationError(format!(
                "Time series value at index {i} must be finite, got {v}"
            )));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }

    /// Time index of the last observation.
    pub fn last_index(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// Iterate over `(time_index, value)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values.iter().copied().enumerate()
    }
}

impl TryFrom<Vec<f64>> for TimeSeries {
    type Error = IndexError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        TimeSeries::new(values)
    }
}

impl From<TimeSeries> for Vec<f64> {
    fn from(series: TimeSeries) -> Self {
        series.values
    }
}

/// Values extrapolated beyond the end of a [`TimeSeries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Time index of the first projected value
    pub start_index: usize,
    pub values: Vec<f64>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn points(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (self.start_index + i, v))
    }

    /// Historical values followed by projected values, tagged by kind.
    pub fn combined_with(&self, history: &TimeSeries) -> Vec<SeriesPoint> {
        let historical = history.points().map(|(t, v)| SeriesPoint {
            time_index: t,
            value: v,
            kind: SeriesKind::Historical,
        });
        let projected = self.points().map(|(t, v)| SeriesPoint {
            time_index: t,
            value: v,
            kind: SeriesKind::Projected,
        });
        historical.chain(projected).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_rejected() {
        assert!(matches!(
            TimeSeries::new(vec![]),
            Err(IndexError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let err = TimeSeries::new(vec![1.0, f64::NAN]).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_json_is_plain_array() {
        let s = TimeSeries::new(vec![1.5, 2.0]).unwrap();
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "[1.5,2.0]");
        let back: TimeSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_deserialize_empty_rejected() {
        let err = serde_json::from_str::<TimeSeries>("[]").unwrap_err();
        assert!(err.to_string().contains("no observations"));
    }

    #[test]
    fn test_points_start_at_zero() {
        let s = TimeSeries::new(vec![5.0, 6.0, 7.0]).unwrap();
        let pts: Vec<_> = s.points().collect();
        assert_eq!(pts, vec![(0, 5.0), (1, 6.0), (2, 7.0)]);
        assert_eq!(s.last_index(), 2);
    }

    #[test]
    fn test_projection_points_continue_index() {
        let p = Projection {
            start_index: 6,
            values: vec![1.0, 2.0],
        };
        let pts: Vec<_> = p.points().collect();
        assert_eq!(pts, vec![(6, 1.0), (7, 2.0)]);
    }

    #[test]
    fn test_combined_series_order() {
        let s = TimeSeries::new(vec![10.0, 11.0]).unwrap();
        let p = Projection {
            start_index: 2,
            values: vec![12.0],
        };
        let combined = p.combined_with(&s);
        assert_eq!(combined.len(), 3);
        assert_eq!(combined[0].kind, SeriesKind::Historical);
        assert_eq!(combined[2].kind, SeriesKind::Projected);
        assert_eq!(combined[2].time_index, 2);
    }

    #[test]
    fn test_series_kind_display() {
        assert_eq!(SeriesKind::Historical.to_string(), "historical");
        assert_eq!(SeriesKind::Projected.to_string(), "projected");
    }
}
