//! Rolling-window anomaly scoring

use super::types::{Anomaly, AnomalyMethod};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::kernels;
use rayon::prelude::*;

/// Consistency constant relating MAD to the standard deviation of a normal
/// distribution
const MAD_SCALE: f64 = 1.4826;

const ZERO_SPREAD: f64 = 1e-12;

/// Score every sample against its trailing window and return the flagged ones
///
/// The window for index `i` is the `min(i + 1, window_size)` samples ending at
/// `i`, so it always contains the sample being scored. Windows with fewer than
/// two samples are never flagged.
///
/// Because the scored sample sits inside its own window, a single outlier in a
/// zscore window of `w` samples scores at most `(w - 1) / sqrt(w)`. With the
/// default threshold of 3 that needs `w >= 11`, so spikes in the first ten
/// samples go unflagged.
pub fn detect(
    data: &[f64],
    method: AnomalyMethod,
    threshold: f64,
    window_size: usize,
) -> AnalyticsResult<Vec<Anomaly>> {
    if window_size == 0 {
        return Err(AnalyticsError::InvalidParameter(
            "windowSize must be at least 1".to_string(),
        ));
    }
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(AnalyticsError::InvalidParameter(format!(
            "threshold must be a non-negative number, got {}",
            threshold
        )));
    }

    let scored = (0..data.len())
        .into_par_iter()
        .map(|i| {
            let start = (i + 1).saturating_sub(window_size);
            score_sample(&data[start..=i], i, data[i], method, threshold)
        })
        .collect::<AnalyticsResult<Vec<_>>>()?;

    Ok(scored.into_iter().flatten().collect())
}

fn score_sample(
    window: &[f64],
    index: usize,
    value: f64,
    method: AnomalyMethod,
    threshold: f64,
) -> AnalyticsResult<Option<Anomaly>> {
    if window.len() < 2 {
        return Ok(None);
    }

    let (score, flagged) = match method {
        AnomalyMethod::Zscore => {
            let deviation = (value - kernels::mean(window)).abs();
            let sd = kernels::stddev(window);
            let score = if sd < ZERO_SPREAD { 0.0 } else { deviation / sd };
            (score, score > threshold)
        }
        AnomalyMethod::Iqr => {
            let sorted = kernels::sorted(window);
            let q1 = kernels::percentile_sorted(&sorted, 25.0);
            let q3 = kernels::percentile_sorted(&sorted, 75.0);
            let iqr = q3 - q1;
            let lower = q1 - threshold * iqr;
            let upper = q3 + threshold * iqr;

            let beyond = (lower - value).max(value - upper).max(0.0);
            let score = if iqr < ZERO_SPREAD { beyond } else { beyond / iqr };
            (score, value < lower || value > upper)
        }
        AnomalyMethod::Mad => {
            let (median, mad) = kernels::median_absolute_deviation(window);
            let scaled = MAD_SCALE * mad;
            let deviation = (value - median).abs();
            let score = if scaled >= ZERO_SPREAD {
                deviation / scaled
            } else if deviation < ZERO_SPREAD {
                0.0
            } else {
                return Err(AnalyticsError::Computation(format!(
                    "median absolute deviation is zero at index {} (deviation {})",
                    index, deviation
                )));
            };
            (score, score > threshold)
        }
    };

    Ok(flagged.then_some(Anomaly {
        index,
        value,
        score,
    }))
}
