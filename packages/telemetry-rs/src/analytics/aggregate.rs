use super::types::AggregateMethod;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::kernels;
use rayon::prelude::*;

/// Reduce sliding windows of `window_size` samples
///
/// Windows start every `max(1, window_size - overlap)` samples. A trailing
/// partial window is dropped.
pub fn aggregate(
    data: &[f64],
    window_size: usize,
    method: AggregateMethod,
    overlap: usize,
) -> AnalyticsResult<Vec<f64>> {
    if window_size == 0 {
        return Err(AnalyticsError::InvalidParameter(
            "windowSize must be at least 1".to_string(),
        ));
    }
    if data.len() < window_size {
        return Ok(Vec::new());
    }

    let step = window_size.saturating_sub(overlap).max(1);
    let starts: Vec<usize> = (0..=data.len() - window_size).step_by(step).collect();

    Ok(starts
        .par_iter()
        .map(|&start| reduce(&data[start..start + window_size], method))
        .collect())
}

fn reduce(window: &[f64], method: AggregateMethod) -> f64 {
    match method {
        AggregateMethod::Mean => kernels::mean(window),
        AggregateMethod::Median => kernels::median(window),
        AggregateMethod::Min => window.iter().copied().fold(f64::INFINITY, f64::min),
        AggregateMethod::Max => window.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregateMethod::Sum => window.iter().sum(),
        AggregateMethod::Stddev => kernels::stddev(window),
    }
}
