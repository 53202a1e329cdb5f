mod aggregate;
mod analyzer;
mod curve_fit;
mod growth_rate;
mod normalize;

pub use aggregate::{calculate_epi, naive_epi, simplified_epi, AggregationMode};
pub use analyzer::{Analyzer, IndexReport};
pub use curve_fit::{
    exponential_fit, fit_exponential, project_emissions, EmissionsProjection, ExponentialModel,
    FitReport, SolverOptions, MIN_FIT_POINTS,
};
pub use growth_rate::{calculate_ghn_score, compound_growth_rate};
pub use normalize::{calculate_indicator_score, raw_indicator_score};
