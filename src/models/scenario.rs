//! Scenario inputs for the three sub-indicators.
//!
//! Defaults reproduce the reference run: national and panel emission totals for
//! GHP and CDA, and the six-year emissions history projected for GHN.

use serde::{Deserialize, Serialize};

use crate::analysis::compound_growth_rate;
use crate::error::IndexError;

/// Emissions divided by population, for the assessed entity and the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerCapitaInputs {
    /// Panel greenhouse-gas emissions total
    pub panel_emissions: f64,
    /// Panel population
    pub panel_population: f64,
    /// Assessed greenhouse-gas emissions total
    pub emissions: f64,
    /// Assessed population
    pub population: f64,
}

impl Default for PerCapitaInputs {
    fn default() -> Self {
        Self {
            panel_emissions: 29_480_000.0,
            panel_population: 548_565.0,
            emissions: 598_000.0,
            population: 13_221.0,
        }
    }
}

impl PerCapitaInputs {
    pub fn panel(&self) -> Result<f64, IndexError> {
        per_capita(self.panel_emissions, self.panel_population)
    }

    pub fn raw(&self) -> Result<f64, IndexError> {
        per_capita(self.emissions, self.population)
    }
}

fn per_capita(emissions: f64, population: f64) -> Result<f64, IndexError> {
    if population == 0.0 || !population.is_finite() || !emissions.is_finite() {
        return Err(IndexError::ValidationError(format!(
            "Per-capita value undefined for emissions {emissions} and population {population}"
        )));
    }
    Ok(emissions / population)
}

/// Start and end emissions over a period, turned into a compound annual rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeclineRateInputs {
    pub panel_start: f64,
    pub panel_end: f64,
    pub panel_periods: u32,
    pub start: f64,
    pub end: f64,
    pub periods: u32,
}

impl Default for DeclineRateInputs {
    fn default() -> Self {
        Self {
            panel_start: 29_480_000.0,
            panel_end: 74_030_000.0,
            panel_periods: 30,
            start: 78_059.0,
            end: 93_243.0,
            periods: 6,
        }
    }
}

impl DeclineRateInputs {
    pub fn panel(&self) -> Result<f64, IndexError> {
        compound_growth_rate(self.panel_start, self.panel_end, self.panel_periods)
    }

    pub fn raw(&self) -> Result<f64, IndexError> {
        compound_growth_rate(self.start, self.end, self.periods)
    }
}

/// Historical emissions to project, and how far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionInputs {
    pub history: Vec<f64>,
    /// Number of future steps to extrapolate
    pub horizon: usize,
    /// Periods between the first observation and the last projected value, as
    /// used by the growth-rate score. Supplied independently of `horizon`.
    pub rate_steps: u32,
}

impl Default for ProjectionInputs {
    fn default() -> Self {
        Self {
            history: vec![95514.0, 88242.0, 93789.0, 91001.0, 91789.0, 92319.0],
            horizon: 18,
            rate_steps: 24,
        }
    }
}

/// All inputs of one index run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub ghp: PerCapitaInputs,
    pub cda: DeclineRateInputs,
    pub ghn: ProjectionInputs,
}
