use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{calculate_epi, calculate_ghn_score, project_emissions, FitReport};
use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::models::{Indicator, Projection, ScoreSet, SeriesPoint, TimeSeries};

/// Everything the report sink displays after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexReport {
    pub indicators: Vec<Indicator>,
    pub scores: ScoreSet,
    pub epi: f64,
    pub history: TimeSeries,
    pub projection: Projection,
    pub fit: FitReport,
}

impl IndexReport {
    /// Index scaled by 100 and rounded to two decimals, as displayed.
    pub fn epi_percent(&self) -> f64 {
        (self.epi * 100.0 * 100.0).round() / 100.0
    }

    /// Historical values followed by the projection, for plotting.
    pub fn combined_series(&self) -> Vec<SeriesPoint> {
        self.projection.combined_with(&self.history)
    }
}

/// Runs the scoring pipeline for one configuration.
pub struct Analyzer<'a> {
    config: &'a IndexConfig,
}

impl<'a> Analyzer<'a> {
    /// Create a new Analyzer for the given configuration.
    pub fn new(config: &'a IndexConfig) -> Self {
        Self { config }
    }

    /// Per-capita emissions indicator.
    pub fn ghp_indicator(&self) -> Result<Indicator, IndexError> {
        let inputs = &self.config.scenario.ghp;
        Ok(Indicator::new(
            "GHP",
            inputs.raw()?,
            self.config.baselines.ghp,
            inputs.panel()?,
        ))
    }

    /// Adjusted emissions decline-rate indicator.
    pub fn cda_indicator(&self) -> Result<Indicator, IndexError> {
        let inputs = &self.config.scenario.cda;
        Ok(Indicator::new(
            "CDA",
            inputs.raw()?,
            self.config.baselines.cda,
            inputs.panel()?,
        ))
    }

    /// Historical emissions series to project.
    pub fn history(&self) -> Result<TimeSeries, IndexError> {
        TimeSeries::new(self.config.scenario.ghn.history.clone())
    }

    /// Run every stage and aggregate. Errors carry the name of the failing stage.
    pub fn run(&self) -> Result<IndexReport, IndexError> {
        let ghp = self.ghp_indicator().map_err(|e| e.in_stage("GHP"))?;
        let ghp_score = ghp.score().map_err(|e| e.in_stage("GHP"))?;
        info!(score = ghp_score, "GHP scored");

        let cda = self.cda_indicator().map_err(|e| e.in_stage("CDA"))?;
        let cda_score = cda.score().map_err(|e| e.in_stage("CDA"))?;
        info!(score = cda_score, "CDA scored");

        let ghn_inputs = &self.config.scenario.ghn;
        let history = self.history().map_err(|e| e.in_stage("GHN projection"))?;
        let projected = project_emissions(&history, ghn_inputs.horizon, &self.config.solver)
            .map_err(|e| e.in_stage("GHN projection"))?;
        let ghn_score = calculate_ghn_score(
            history.values(),
            &projected.projection.values,
            ghn_inputs.rate_steps,
        )
        .map_err(|e| e.in_stage("GHN rate"))?;
        info!(score = ghn_score, steps = ghn_inputs.rate_steps, "GHN scored");

        let mut scores = ScoreSet::new();
        scores.insert("GHP", ghp_score)?;
        scores.insert("CDA", cda_score)?;
        scores.insert("GHN", ghn_score)?;

        let settings = &self.config.aggregation;
        let epi = calculate_epi(
            &scores,
            settings.total_weight,
            settings.reference_count,
            settings.mode,
        )
        .map_err(|e| e.in_stage("aggregation"))?;
        info!(epi, mode = %settings.mode, "composite index computed");

        Ok(IndexReport {
            indicators: vec![ghp, cda],
            scores,
            epi,
            history,
            projection: projected.projection,
            fit: projected.fit,
        })
    }
}
