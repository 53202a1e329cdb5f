use crate::error::IndexError;

/// Real `n`-th root of `ratio` minus one.
///
/// Negative ratios only have a real root for odd `n`.
fn rate_from_ratio(ratio: f64, n: u32) -> Result<f64, IndexError> {
    if n == 0 {
        return Err(IndexError::DomainError(
            "Step count must be at least 1".to_string(),
        ));
    }
    if !ratio.is_finite() {
        return Err(IndexError::DomainError(format!(
            "Ratio {ratio} has no finite root"
        )));
    }
    let exponent = 1.0 / n as f64;
    let root = if ratio >= 0.0 {
        ratio.powf(exponent)
    } else if n % 2 == 1 {
        -(-ratio).powf(exponent)
    } else {
        return Err(IndexError::DomainError(format!(
            "Ratio {ratio} is negative and has no real root of even order {n}"
        )));
    };
    Ok(root - 1.0)
}

/// Projected emissions growth score: `(history[0] / projection[last])^(1/steps) - 1`.
///
/// `steps` is the number of periods between the first historical value and the
/// last projected one. It is supplied by the caller and is not derived from the
/// lengths of the two series.
pub fn calculate_ghn_score(
    history: &[f64],
    projection: &[f64],
    steps: u32,
) -> Result<f64, IndexError> {
    let (Some(&first), Some(&last)) = (history.first(), projection.last()) else {
        return Err(IndexError::DomainError(
            "Growth rate needs a historical and a projected value".to_string(),
        ));
    };
    if last == 0.0 {
        return Err(IndexError::DomainError(
            "Last projected value is zero".to_string(),
        ));
    }
    rate_from_ratio(first / last, steps)
}

/// Compound rate per period that turns `start` into `end` over `periods`:
/// `(end / start)^(1/periods) - 1`.
pub fn compound_growth_rate(start: f64, end: f64, periods: u32) -> Result<f64, IndexError> {
    if start == 0.0 {
        return Err(IndexError::DomainError(
            "Compound rate undefined for a zero starting value".to_string(),
        ));
    }
    rate_from_ratio(end / start, periods)
}
