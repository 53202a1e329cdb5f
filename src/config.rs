//! Run configuration.
//!
//! Every section defaults to the reference constants, so an empty TOML file (or
//! no file at all) reproduces the reference run. Sections and fields left out
//! of a file keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{AggregationMode, SolverOptions};
use crate::error::IndexError;
use crate::models::Scenario;

/// Baseline anchors used to normalize each indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorBaselines {
    /// Greenhouse gas emissions per capita
    pub ghp: f64,
    /// Adjusted emissions growth rate for carbon dioxide
    pub cda: f64,
    /// Projected GHG emissions. The GHN score enters the index as computed by
    /// the growth-rate scorer, so this anchor is informational.
    pub ghn: f64,
}

impl Default for IndicatorBaselines {
    fn default() -> Self {
        Self {
            ghp: 0.026315,
            cda: 0.36317,
            ghn: 0.36317,
        }
    }
}

/// Constants of the weight-rebalancing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationSettings {
    /// Total weight of all indicators in the full index
    pub total_weight: f64,
    /// Number of indicators in the full index
    pub reference_count: u32,
    pub mode: AggregationMode,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            total_weight: 15.9997,
            reference_count: 54,
            mode: AggregationMode::Literal,
        }
    }
}

/// Complete configuration of one index run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub baselines: IndicatorBaselines,
    pub aggregation: AggregationSettings,
    pub solver: SolverOptions,
    pub scenario: Scenario,
}

impl IndexConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, IndexError> {
        let config: IndexConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, IndexError> {
        toml::to_string_pretty(self)
            .map_err(|e| IndexError::ValidationError(format!("Cannot serialize config: {e}")))
    }

    /// Check the settings that can be checked before running the pipeline.
    pub fn validate(&self) -> Result<(), IndexError> {
        let b = &self.baselines;
        for (name, value) in [("ghp", b.ghp), ("cda", b.cda), ("ghn", b.ghn)] {
            if !value.is_finite() {
                return Err(IndexError::ValidationError(format!(
                    "Baseline '{name}' must be finite, got {value}"
                )));
            }
        }
        if !self.aggregation.total_weight.is_finite() {
            return Err(IndexError::ValidationError(format!(
                "Total weight must be finite, got {}",
                self.aggregation.total_weight
            )));
        }
        if self.aggregation.reference_count == 0 {
            return Err(IndexError::ValidationError(
                "Reference indicator count must be at least 1".to_string(),
            ));
        }
        if self.scenario.ghn.horizon == 0 {
            return Err(IndexError::ValidationError(
                "Projection horizon must be at least 1 step".to_string(),
            ));
        }
        self.solver.validate()
    }
}
