use serde::{Deserialize, Serialize};

use crate::analysis::calculate_indicator_score;
use crate::error::IndexError;

/// A named quantity normalized against a baseline and a panel benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// Indicator code (e.g., "GHP")
    pub name: String,
    /// Measured value
    pub raw_value: f64,
    /// Reference or worst-case anchor
    pub baseline: f64,
    /// Best-case benchmark
    pub panel: f64,
}

impl Indicator {
    pub fn new(name: impl Into<String>, raw_value: f64, baseline: f64, panel: f64) -> Self {
        Self {
            name: name.into(),
            raw_value,
            baseline,
            panel,
        }
    }

    /// Validate the indicator inputs. Returns `IndexError::ValidationError` on failure.
    pub fn validate(&self) -> Result<(), IndexError> {
        for (label, value) in [
            ("raw value", self.raw_value),
            ("baseline", self.baseline),
            ("panel", self.panel),
        ] {
            if !value.is_finite() {
                return Err(IndexError::ValidationError(format!(
                    "{}: {label} must be finite, got {value}",
                    self.name
                )));
            }
        }
        if self.baseline == self.panel {
            return Err(IndexError::ValidationError(format!(
                "{}: baseline and panel are both {}, normalization is undefined",
                self.name, self.baseline
            )));
        }
        Ok(())
    }

    /// Normalized score of this indicator.
    pub fn score(&self) -> Result<f64, IndexError> {
        self.validate()?;
        calculate_indicator_score(self.raw_value, self.baseline, self.panel)
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (raw {}, baseline {}, panel {})",
            self.name, self.raw_value, self.baseline, self.panel
        )
    }
}
