use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::IndexError;
use crate::models::ScoreSet;

/// How the composite index is computed from the score set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// `sum * (total_weight / reference_count) / (sum / len)`.
    /// A zero score sum is reported as an error.
    #[default]
    Literal,
    /// `len * total_weight / reference_count`, defined for every score sum.
    Simplified,
}

impl std::fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationMode::Literal => write!(f, "literal"),
            AggregationMode::Simplified => write!(f, "simplified"),
        }
    }
}

impl std::str::FromStr for AggregationMode {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "literal" | "naive" => Ok(AggregationMode::Literal),
            "simplified" | "robust" => Ok(AggregationMode::Simplified),
            _ => Err(IndexError::ValidationError(format!(
                "Unknown aggregation mode: '{s}'"
            ))),
        }
    }
}

/// Reference aggregation formula. Yields `NaN` when the score sum is zero.
pub fn naive_epi(scores: &ScoreSet, total_weight: f64, reference_count: u32) -> f64 {
    let sum = scores.sum();
    let n = scores.len() as f64;
    sum * (total_weight / reference_count as f64) / (sum / n)
}

/// Algebraic simplification of [`naive_epi`]: the score sum cancels.
pub fn simplified_epi(scores: &ScoreSet, total_weight: f64, reference_count: u32) -> f64 {
    scores.len() as f64 * total_weight / reference_count as f64
}

/// Compute the rebalanced composite index.
pub fn calculate_epi(
    scores: &ScoreSet,
    total_weight: f64,
    reference_count: u32,
    mode: AggregationMode,
) -> Result<f64, IndexError> {
    if scores.is_empty() {
        return Err(IndexError::ValidationError(
            "Cannot aggregate an empty score set".to_string(),
        ));
    }
    if reference_count == 0 {
        return Err(IndexError::ValidationError(
            "Reference indicator count must be at least 1".to_string(),
        ));
    }
    if !total_weight.is_finite() {
        return Err(IndexError::ValidationError(format!(
            "Total weight must be finite, got {total_weight}"
        )));
    }

    let sum = scores.sum();
    match mode {
        AggregationMode::Literal => {
            if sum == 0.0 {
                return Err(IndexError::AggregationError(
                    "Score sum is zero; the literal formula is 0/0".to_string(),
                ));
            }
            let epi = naive_epi(scores, total_weight, reference_count);
            if !epi.is_finite() {
                return Err(IndexError::AggregationError(format!(
                    "Composite index is not finite (score sum {sum})"
                )));
            }
            Ok(epi)
        }
        AggregationMode::Simplified => {
            if sum == 0.0 {
                warn!("score sum is zero, using the simplified aggregation result");
            }
            Ok(simplified_epi(scores, total_weight, reference_count))
        }
    }
}
