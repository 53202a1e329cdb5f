//! Exponential curve fitting and emissions projection.
//!
//! Fits `f(t) = a * exp(-b * t) + c` to a [`TimeSeries`] with a
//! Levenberg-Marquardt solver and extrapolates the fitted curve.
//!
//! The solver uses the analytic Jacobian, Marquardt scaling (the damping term is
//! proportional to the largest diagonal of `JᵀJ` seen so far) and Nielsen's
//! damping update. It is fully deterministic.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{debug, info, warn};

use crate::error::IndexError;
use crate::models::{Projection, TimeSeries};

/// Minimum number of observations for a stable three-parameter fit.
pub const MIN_FIT_POINTS: usize = 4;

const MAX_DAMPING: f64 = 1e300;

/// Evaluate `a * exp(-b * t) + c`.
pub fn exponential_fit(t: f64, a: f64, b: f64, c: f64) -> f64 {
    a * (-b * t).exp() + c
}

/// Parameters of `f(t) = amplitude * exp(-decay_rate * t) + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialModel {
    pub amplitude: f64,
    /// Positive values decay towards `offset`, negative values grow away from it
    pub decay_rate: f64,
    pub offset: f64,
}

impl ExponentialModel {
    pub fn new(amplitude: f64, decay_rate: f64, offset: f64) -> Self {
        Self {
            amplitude,
            decay_rate,
            offset,
        }
    }

    pub fn evaluate(&self, t: f64) -> f64 {
        exponential_fit(t, self.amplitude, self.decay_rate, self.offset)
    }

    pub fn is_finite(&self) -> bool {
        self.amplitude.is_finite() && self.decay_rate.is_finite() && self.offset.is_finite()
    }

    fn from_vector(v: &Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.amplitude, self.decay_rate, self.offset)
    }

    /// Partial derivatives with respect to (amplitude, decay_rate, offset).
    fn gradient(&self, t: f64) -> Vector3<f64> {
        let e = (-self.decay_rate * t).exp();
        Vector3::new(e, -self.amplitude * t * e, 1.0)
    }
}

/// Solver seed, iteration cap and convergence tolerances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Starting (amplitude, decay_rate, offset)
    pub initial_guess: [f64; 3],
    pub max_iterations: usize,
    /// Relative reduction of the residual sum of squares
    pub ftol: f64,
    /// Relative step size
    pub xtol: f64,
    /// Largest component of the gradient `Jᵀr`
    pub gtol: f64,
    /// Retry once from a closed-form seed when the initial guess does not converge
    pub fallback_seed: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            initial_guess: [1.0, 1.0, 1.0],
            max_iterations: 1000,
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-12,
            fallback_seed: true,
        }
    }
}

impl SolverOptions {
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.max_iterations == 0 {
            return Err(IndexError::ValidationError(
                "Solver max_iterations must be at least 1".to_string(),
            ));
        }
        if self.initial_guess.iter().any(|v| !v.is_finite()) {
            return Err(IndexError::ValidationError(format!(
                "Solver initial guess must be finite, got {:?}",
                self.initial_guess
            )));
        }
        for (name, tol) in [("ftol", self.ftol), ("xtol", self.xtol), ("gtol", self.gtol)] {
            if !tol.is_finite() || tol < 0.0 {
                return Err(IndexError::ValidationError(format!(
                    "Solver {name} must be a non-negative number, got {tol}"
                )));
            }
        }
        Ok(())
    }
}

/// Result of fitting the exponential model to a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub model: ExponentialModel,
    pub iterations: usize,
    pub residual_sum_squares: f64,
    pub r_squared: f64,
    pub used_fallback_seed: bool,
}

/// A fitted curve together with its extrapolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsProjection {
    pub fit: FitReport,
    pub projection: Projection,
}

/// Fit the exponential model to `series` by nonlinear least squares.
pub fn fit_exponential(
    series: &TimeSeries,
    options: &SolverOptions,
) -> Result<FitReport, IndexError> {
    if series.len() < MIN_FIT_POINTS {
        return Err(IndexError::InsufficientData(format!(
            "Need at least {MIN_FIT_POINTS} observations to fit an exponential curve, got {}",
            series.len()
        )));
    }
    options.validate()?;

    let times: Vec<f64> = series.points().map(|(t, _)| t as f64).collect();
    let values = series.values();
    let [a, b, c] = options.initial_guess;
    let seed = ExponentialModel::new(a, b, c);

    let (outcome, used_fallback_seed) = match levenberg_marquardt(&times, values, seed, options) {
        Ok(outcome) if options.fallback_seed => {
            // A stop at a point that only matches y[0] looks like convergence too,
            // so the three-point seed competes on residuals.
            let alternative = three_point_seed(&times, values)
                .and_then(|seed| levenberg_marquardt(&times, values, seed, options).ok());
            match alternative {
                Some(alt) if alt.cost < outcome.cost => {
                    debug!(
                        initial_rss = outcome.cost,
                        three_point_rss = alt.cost,
                        "three-point seed gave the better fit"
                    );
                    (alt, true)
                }
                _ => (outcome, false),
            }
        }
        Ok(outcome) => (outcome, false),
        Err(err) if options.fallback_seed => {
            let fallback = three_point_seed(&times, values).ok_or(err)?;
            warn!(
                amplitude = fallback.amplitude,
                decay_rate = fallback.decay_rate,
                offset = fallback.offset,
                "initial guess did not converge, retrying from three-point seed"
            );
            (levenberg_marquardt(&times, values, fallback, options)?, true)
        }
        Err(err) => return Err(err),
    };

    let r_squared = coefficient_of_determination(values, outcome.cost);
    info!(
        amplitude = outcome.model.amplitude,
        decay_rate = outcome.model.decay_rate,
        offset = outcome.model.offset,
        iterations = outcome.iterations,
        rss = outcome.cost,
        "fitted exponential model"
    );

    Ok(FitReport {
        model: outcome.model,
        iterations: outcome.iterations,
        residual_sum_squares: outcome.cost,
        r_squared,
        used_fallback_seed,
    })
}

/// Fit `series` and evaluate the curve at the `horizon` time indices following it.
pub fn project_emissions(
    series: &TimeSeries,
    horizon: usize,
    options: &SolverOptions,
) -> Result<EmissionsProjection, IndexError> {
    if horizon == 0 {
        return Err(IndexError::ValidationError(
            "Projection horizon must be at least 1 step".to_string(),
        ));
    }

    let fit = fit_exponential(series, options)?;
    let start_index = series.last_index() + 1;
    let values: Vec<f64> = (start_index..start_index + horizon)
        .map(|t| fit.model.evaluate(t as f64))
        .collect();

    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(IndexError::FitFailure(format!(
            "Fitted curve is not finite at time index {}",
            start_index + pos
        )));
    }

    Ok(EmissionsProjection {
        fit,
        projection: Projection {
            start_index,
            values,
        },
    })
}

struct SolverOutcome {
    model: ExponentialModel,
    iterations: usize,
    cost: f64,
}

fn sum_of_squares(times: &[f64], values: &[f64], model: &ExponentialModel) -> f64 {
    times
        .iter()
        .zip(values)
        .map(|(&t, &y)| (y - model.evaluate(t)).powi(2))
        .sum()
}

fn levenberg_marquardt(
    times: &[f64],
    values: &[f64],
    seed: ExponentialModel,
    options: &SolverOptions,
) -> Result<SolverOutcome, IndexError> {
    let mut params = seed.to_vector();
    let mut cost = sum_of_squares(times, values, &seed);
    if !cost.is_finite() {
        return Err(IndexError::FitFailure(format!(
            "Residuals are not finite at the initial guess {seed:?}"
        )));
    }

    let mut scale = Vector3::<f64>::zeros();
    let mut lambda: Option<f64> = None;
    let mut nu = 2.0;

    for iteration in 0..options.max_iterations {
        let model = ExponentialModel::from_vector(&params);
        let mut jtj = Matrix3::<f64>::zeros();
        let mut jtr = Vector3::<f64>::zeros();
        for (&t, &y) in times.iter().zip(values) {
            let g = model.gradient(t);
            jtj += g * g.transpose();
            jtr += g * (y - model.evaluate(t));
        }
        for i in 0..3 {
            scale[i] = scale[i].max(jtj[(i, i)]);
        }

        if jtr.amax() <= options.gtol {
            debug!(iteration, "gradient below tolerance");
            return finish(params, iteration, cost);
        }

        let mut damping = *lambda.get_or_insert_with(|| {
            let largest = scale.max();
            1e-3 * if largest > 0.0 { largest } else { 1.0 }
        });
        let weights = scale.map(|s| if s > 0.0 { s } else { 1.0 });

        loop {
            let d = Matrix3::from_diagonal(&(weights * damping));
            let step = (jtj + d)
                .lu()
                .solve(&jtr)
                .filter(|s| s.iter().all(|v| v.is_finite()));

            if let Some(step) = step {
                let candidate = params + step;
                let candidate_cost =
                    sum_of_squares(times, values, &ExponentialModel::from_vector(&candidate));
                let predicted = step.dot(&(d * step + jtr));
                let rho = if predicted > 0.0 {
                    (cost - candidate_cost) / predicted
                } else {
                    -1.0
                };

                if rho > 0.0 && candidate_cost.is_finite() {
                    let reduction = if cost > 0.0 {
                        (cost - candidate_cost) / cost
                    } else {
                        0.0
                    };
                    let converged = candidate_cost == 0.0
                        || reduction <= options.ftol
                        || step.norm() <= options.xtol * (candidate.norm() + options.xtol);

                    params = candidate;
                    cost = candidate_cost;
                    damping *= (1.0f64 / 3.0).max(1.0 - (2.0 * rho - 1.0).powi(3));
                    nu = 2.0;
                    lambda = Some(damping);

                    if converged {
                        debug!(iteration, cost, "converged");
                        return finish(params, iteration + 1, cost);
                    }
                    break;
                }
            }

            damping *= nu;
            nu *= 2.0;
            lambda = Some(damping);
            if !damping.is_finite() || damping > MAX_DAMPING {
                // No step reduces the residuals any further.
                debug!(iteration, cost, "damping exhausted");
                return finish(params, iteration + 1, cost);
            }
        }
    }

    Err(IndexError::FitFailure(format!(
        "Solver did not converge within {} iterations",
        options.max_iterations
    )))
}

fn finish(
    params: Vector3<f64>,
    iterations: usize,
    cost: f64,
) -> Result<SolverOutcome, IndexError> {
    let model = ExponentialModel::from_vector(&params);
    if !model.is_finite() || !cost.is_finite() {
        return Err(IndexError::FitFailure(format!(
            "Solver produced non-finite parameters {model:?}"
        )));
    }
    Ok(SolverOutcome {
        model,
        iterations,
        cost,
    })
}

/// Closed-form seed from three equally spaced samples (first, middle, last).
fn three_point_seed(times: &[f64], values: &[f64]) -> Option<ExponentialModel> {
    let m = (values.len() - 1) / 2;
    let (y0, y1, y2) = (values[0], values[m], values[2 * m]);
    let (d1, d2) = (y1 - y0, y2 - y1);
    if d1 == 0.0 || d2 == 0.0 {
        return None;
    }
    let ratio = d2 / d1;
    if ratio <= 0.0 || ratio == 1.0 {
        return None;
    }
    let h = times[m] - times[0];
    let b = -ratio.ln() / h;
    let a = d1 / ((-b * h).exp() - 1.0);
    let c = y0 - a * (-b * times[0]).exp();
    let seed = ExponentialModel::new(a, b, c);
    seed.is_finite().then_some(seed)
}

fn coefficient_of_determination(values: &[f64], rss: f64) -> f64 {
    let mean = values.iter().mean();
    let total: f64 = values.iter().map(|y| (y - mean).powi(2)).sum();
    if total > 0.0 {
        1.0 - rss / total
    } else if rss == 0.0 {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_HISTORY: [f64; 6] = [95514.0, 88242.0, 93789.0, 91001.0, 91789.0, 92319.0];

    fn synthetic(a: f64, b: f64, c: f64, n: usize) -> TimeSeries {
        TimeSeries::new((0..n).map(|t| exponential_fit(t as f64, a, b, c)).collect()).unwrap()
    }

    fn assert_recovers(a: f64, b: f64, c: f64) {
        let series = synthetic(a, b, c, 8);
        let fit = fit_exponential(&series, &SolverOptions::default()).unwrap();
        let m = fit.model;
        assert!((m.amplitude - a).abs() < 1e-4, "amplitude {} vs {a}", m.amplitude);
        assert!((m.decay_rate - b).abs() < 1e-4, "decay {} vs {b}", m.decay_rate);
        assert!((m.offset - c).abs() < 1e-4, "offset {} vs {c}", m.offset);
        assert!(fit.r_squared > 0.999_999);
    }

    #[test]
    fn test_exponential_fit_formula() {
        for &t in &[0.0, 0.5, 3.0, 10.0] {
            let expected = 2.0 * (-0.3f64 * t).exp() + 7.0;
            assert_eq!(exponential_fit(t, 2.0, 0.3, 7.0), expected);
        }
    }

    #[test]
    fn test_model_evaluate_matches_free_function() {
        let m = ExponentialModel::new(-1.5, -0.2, 4.0);
        assert_eq!(m.evaluate(3.0), exponential_fit(3.0, -1.5, -0.2, 4.0));
    }

    #[test]
    fn test_recovers_decay_parameters() {
        assert_recovers(2.5, 1.3, 0.5);
        assert_recovers(5.0, 0.5, -2.0);
        assert_recovers(3.0, 0.2, 1.0);
        assert_recovers(100.0, 0.1, 50.0);
    }

    #[test]
    fn test_recovers_negative_amplitude_positive_rate() {
        assert_recovers(-2.0, 0.8, 4.0);
    }

    #[test]
    fn test_recovers_negative_amplitude_negative_rate() {
        assert_recovers(-3.0, -0.2, 10.0);
        assert_recovers(-2.0, -0.3, 5.0);
    }

    #[test]
    fn test_recovers_positive_amplitude_negative_rate() {
        assert_recovers(1.0, -std::f64::consts::LN_2, 0.0);
        assert_recovers(2.0, -0.05, 1.0);
    }

    #[test]
    fn test_doubling_series_not_flattened() {
        let series = TimeSeries::new(vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0]).unwrap();
        let fit = fit_exponential(&series, &SolverOptions::default()).unwrap();
        assert!(fit.used_fallback_seed);
        assert!(fit.residual_sum_squares < 1e-12);
        assert!((fit.model.decay_rate + std::f64::consts::LN_2).abs() < 1e-6);

        let projected = project_emissions(&series, 2, &SolverOptions::default()).unwrap();
        assert!((projected.projection.values[0] - 64.0).abs() < 1e-6);
        assert!((projected.projection.values[1] - 128.0).abs() < 1e-6);
    }

    #[test]
    fn test_growth_without_fallback_fails() {
        let series = synthetic(-2.0, -0.3, 5.0, 8);
        let options = SolverOptions {
            max_iterations: 200,
            fallback_seed: false,
            ..Default::default()
        };
        let err = fit_exponential(&series, &options).unwrap_err();
        assert!(matches!(err, IndexError::FitFailure(_)));
    }

    #[test]
    fn test_insufficient_points() {
        let series = TimeSeries::new(vec![1.0, 2.0, 3.0]).unwrap();
        let err = fit_exponential(&series, &SolverOptions::default()).unwrap_err();
        assert!(matches!(err, IndexError::InsufficientData(_)));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let series = synthetic(1.0, 0.5, 0.0, 6);
        let options = SolverOptions {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(matches!(
            fit_exponential(&series, &options),
            Err(IndexError::ValidationError(_))
        ));
        let options = SolverOptions {
            xtol: -1.0,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let series = synthetic(1.0, 0.5, 0.0, 6);
        let err = project_emissions(&series, 0, &SolverOptions::default()).unwrap_err();
        assert!(matches!(err, IndexError::ValidationError(_)));
    }

    #[test]
    fn test_projection_indices_and_values() {
        let series = synthetic(4.0, 0.4, 1.0, 6);
        let result = project_emissions(&series, 5, &SolverOptions::default()).unwrap();
        assert_eq!(result.projection.start_index, 6);
        assert_eq!(result.projection.len(), 5);
        for (t, v) in result.projection.points() {
            let expected = exponential_fit(t as f64, 4.0, 0.4, 1.0);
            assert!((v - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_projection_is_deterministic() {
        let series = TimeSeries::new(REFERENCE_HISTORY.to_vec()).unwrap();
        let first = project_emissions(&series, 18, &SolverOptions::default()).unwrap();
        let second = project_emissions(&series, 18, &SolverOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reference_history_fit() {
        let series = TimeSeries::new(REFERENCE_HISTORY.to_vec()).unwrap();
        let result = project_emissions(&series, 18, &SolverOptions::default()).unwrap();
        let m = result.fit.model;
        assert!(!result.fit.used_fallback_seed);
        assert!(m.decay_rate > 1.0);
        // Fast decay leaves the offset at the mean of the tail observations.
        assert!((m.offset - 91428.0).abs() < 1e-3);
        assert!((m.amplitude - 4086.0).abs() < 1e-3);
        assert_eq!(result.projection.len(), 18);
        for v in &result.projection.values {
            assert!((v - 91428.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_reference_projection_not_oscillating() {
        let series = TimeSeries::new(REFERENCE_HISTORY.to_vec()).unwrap();
        let result = project_emissions(&series, 18, &SolverOptions::default()).unwrap();
        let diffs: Vec<f64> = result
            .projection
            .values
            .windows(2)
            .map(|w| w[1] - w[0])
            .collect();
        let rising = diffs.iter().all(|d| *d >= 0.0);
        let falling = diffs.iter().all(|d| *d <= 0.0);
        assert!(rising || falling);
    }

    #[test]
    fn test_three_point_seed_exact_for_clean_data() {
        let series = synthetic(-2.0, -0.3, 5.0, 7);
        let times: Vec<f64> = (0..7).map(|t| t as f64).collect();
        let seed = three_point_seed(&times, series.values()).unwrap();
        assert!((seed.amplitude + 2.0).abs() < 1e-9);
        assert!((seed.decay_rate + 0.3).abs() < 1e-9);
        assert!((seed.offset - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_three_point_seed_rejects_flat_data() {
        let times = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert!(three_point_seed(&times, &[1.0, 1.0, 1.0, 1.0, 1.0]).is_none());
    }

    #[test]
    fn test_fit_report_json_roundtrip() {
        let series = synthetic(2.0, 0.5, 1.0, 6);
        let fit = fit_exponential(&series, &SolverOptions::default()).unwrap();
        let json = serde_json::to_string(&fit).unwrap();
        let back: FitReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.iterations, fit.iterations);
        assert!((back.model.offset - fit.model.offset).abs() < 1e-12);
    }
}
