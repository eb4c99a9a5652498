//! Momentum calculation over a short window of daily closes.

use crate::{MomentumResult, PricePoint, PulseError};

/// Decimal places kept on every return and on the score.
pub const RETURN_PRECISION: u32 = 4;

/// Round to `places` decimal places, half away from zero. Never yields `-0.0`.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor + 0.0
}

/// Round a return, keeping the sign of moves smaller than the precision.
///
/// A nonzero move that would round to zero is reported as one unit in the
/// last kept place, so a rise is never flattened into "no change".
fn round_return(value: f64) -> f64 {
    let rounded = round_to(value, RETURN_PRECISION);
    if rounded == 0.0 && value != 0.0 {
        (1.0 / 10f64.powi(RETURN_PRECISION as i32)).copysign(value)
    } else {
        rounded
    }
}

/// Day-over-day fractional returns for `prices` (oldest first) and their mean.
///
/// Each return is rounded to [`RETURN_PRECISION`] places, except that a
/// nonzero move never rounds to zero; the score is the mean of the rounded
/// returns, rounded the same way.
pub fn compute_momentum(prices: &[f64]) -> Result<MomentumResult, PulseError> {
    if prices.len() < 2 {
        return Err(PulseError::InsufficientData(format!(
            "need at least 2 prices to compute momentum, got {}",
            prices.len()
        )));
    }

    if let Some(bad) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
        return Err(PulseError::InvalidData(format!(
            "closing prices must be positive, got {}",
            bad
        )));
    }

    let returns: Vec<f64> = prices
        .windows(2)
        .map(|w| round_return((w[1] - w[0]) / w[0]))
        .collect();

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;

    Ok(MomentumResult {
        returns,
        score: round_to(mean, RETURN_PRECISION),
    })
}

/// Keep the `lookback` most recent points, oldest first.
pub fn recent_window(points: &[PricePoint], lookback: usize) -> Vec<PricePoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(lookback);
    sorted.reverse();
    sorted
}

/// Momentum over the `lookback` most recent points, in any input order.
pub fn momentum_from_points(points: &[PricePoint], lookback: usize) -> Result<MomentumResult, PulseError> {
    let closes: Vec<f64> = recent_window(points, lookback)
        .iter()
        .map(|p| p.close)
        .collect();
    compute_momentum(&closes)
}
