use super::types::SmoothingMethod;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::kernels;

pub fn smooth(
    data: &[f64],
    method: SmoothingMethod,
    window_size: usize,
    alpha: f64,
    sigma: f64,
) -> AnalyticsResult<Vec<f64>> {
    match method {
        SmoothingMethod::MovingAverage | SmoothingMethod::SavitzkyGolay => {
            moving_average(data, window_size)
        }
        SmoothingMethod::Exponential => exponential(data, alpha),
        SmoothingMethod::Gaussian => gaussian(data, window_size, sigma),
    }
}

fn require_window(window_size: usize) -> AnalyticsResult<()> {
    if window_size == 0 {
        return Err(AnalyticsError::InvalidParameter(
            "windowSize must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Centered moving average spanning `window_size / 2` samples on each side,
/// clipped at the edges
pub fn moving_average(data: &[f64], window_size: usize) -> AnalyticsResult<Vec<f64>> {
    require_window(window_size)?;

    let half = window_size / 2;
    let mut prefix = Vec::with_capacity(data.len() + 1);
    prefix.push(0.0);
    for &x in data {
        prefix.push(prefix[prefix.len() - 1] + x);
    }

    Ok((0..data.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(data.len() - 1);
            (prefix[hi + 1] - prefix[lo]) / (hi + 1 - lo) as f64
        })
        .collect())
}

/// `s_0 = x_0`, `s_i = alpha * x_i + (1 - alpha) * s_{i-1}`
pub fn exponential(data: &[f64], alpha: f64) -> AnalyticsResult<Vec<f64>> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(AnalyticsError::InvalidParameter(format!(
            "alpha must be in (0, 1], got {}",
            alpha
        )));
    }

    let mut result = Vec::with_capacity(data.len());
    let mut state = None;
    for &x in data {
        let next = match state {
            None => x,
            Some(prev) => alpha * x + (1.0 - alpha) * prev,
        };
        result.push(next);
        state = Some(next);
    }
    Ok(result)
}

pub fn gaussian(data: &[f64], window_size: usize, sigma: f64) -> AnalyticsResult<Vec<f64>> {
    require_window(window_size)?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(AnalyticsError::InvalidParameter(format!(
            "sigma must be a positive number, got {}",
            sigma
        )));
    }

    // Taps past 2n + 1 never overlap the data
    let taps = window_size.min(2 * data.len() + 1);
    let kernel = kernels::gaussian_kernel(taps, sigma);
    Ok(kernels::convolve_normalized(data, &kernel))
}
