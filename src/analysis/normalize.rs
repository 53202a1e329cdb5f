use crate::error::IndexError;

/// Reference normalization formula: `((x - w) / (b - w)) / 100`.
///
/// Produces `inf` or `NaN` when `w == b`; use [`calculate_indicator_score`]
/// for a checked version.
pub fn raw_indicator_score(x: f64, w: f64, b: f64) -> f64 {
    ((x - w) / (b - w)) / 100.0
}

/// Normalize a raw value `x` against a baseline `w` and a panel value `b`.
///
/// The result is not clamped: negative scores mean worse than baseline, scores
/// above the panel ratio mean better than panel.
pub fn calculate_indicator_score(x: f64, w: f64, b: f64) -> Result<f64, IndexError> {
    if w == b {
        return Err(IndexError::ValidationError(format!(
            "Baseline ({w}) equals panel value ({b}); score is undefined"
        )));
    }
    let score = raw_indicator_score(x, w, b);
    if !score.is_finite() {
        return Err(IndexError::ValidationError(format!(
            "Indicator score is not finite for x={x}, baseline={w}, panel={b}"
        )));
    }
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basic_score() {
        let s = calculate_indicator_score(50.0, 0.0, 100.0).unwrap();
        assert!((s - 0.005).abs() < 1e-15);
    }

    #[test]
    fn test_raw_value_at_baseline_is_zero() {
        assert_eq!(calculate_indicator_score(3.0, 3.0, 10.0).unwrap(), 0.0);
    }

    #[test]
    fn test_raw_value_at_panel_is_one_percent() {
        let s = calculate_indicator_score(10.0, 3.0, 10.0).unwrap();
        assert!((s - 0.01).abs() < 1e-15);
    }

    #[test]
    fn test_worse_than_baseline_is_negative() {
        assert!(calculate_indicator_score(1.0, 3.0, 10.0).unwrap() < 0.0);
    }

    #[test]
    fn test_equal_baseline_and_panel_is_error() {
        let err = calculate_indicator_score(1.0, 2.0, 2.0).unwrap_err();
        assert!(matches!(err, IndexError::ValidationError(_)));
    }

    #[test]
    fn test_raw_formula_degenerates_on_equal_inputs() {
        assert!(raw_indicator_score(1.0, 2.0, 2.0).is_infinite());
        assert!(raw_indicator_score(2.0, 2.0, 2.0).is_nan());
    }

    #[test]
    fn test_reference_ghp_score() {
        let b = 29_480_000.0 / 548_565.0;
        let x = 598_000.0 / 13_221.0;
        let s = calculate_indicator_score(x, 0.026315, b).unwrap();
        assert!((s - 0.008415839918071284).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_matches_formula(
            x in -1.0e6f64..1.0e6,
            w in -1.0e3f64..1.0e3,
            gap in 1.0e-3f64..1.0e3,
        ) {
            let b = w + gap;
            let s = calculate_indicator_score(x, w, b).unwrap();
            let expected = ((x - w) / (b - w)) / 100.0;
            prop_assert!((s - expected).abs() <= 1e-12 * expected.abs().max(1.0));
        }
    }
}
