//! Point interpolation and fixed-rate resampling

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::types::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    #[default]
    Linear,
    Nearest,
    /// Currently evaluated as linear; no spline is fitted
    Cubic,
}

/// Blend between `a` and `b` at `x` with the given method
fn blend(a: Point, b: Point, x: f64, method: InterpolationMethod) -> f64 {
    let span = b.x - a.x;
    match method {
        InterpolationMethod::Nearest => {
            if (x - a.x).abs() <= (b.x - x).abs() {
                a.y
            } else {
                b.y
            }
        }
        InterpolationMethod::Linear | InterpolationMethod::Cubic => {
            if span.abs() < f64::EPSILON {
                a.y
            } else {
                a.y + (b.y - a.y) * (x - a.x) / span
            }
        }
    }
}

/// Interpolate the value at `x`, scanning forward from index `from`
///
/// Returns the value and the index of the left bracket so callers walking
/// increasing x can resume the scan. `x` outside the data clamps to the
/// first or last point.
pub fn interpolate_from(
    points: &[Point],
    x: f64,
    method: InterpolationMethod,
    from: usize,
) -> Option<(f64, usize)> {
    let first = points.first()?;
    let last = points.last()?;

    if x <= first.x {
        return Some((first.y, 0));
    }
    if x >= last.x {
        return Some((last.y, points.len() - 1));
    }

    let mut i = from.min(points.len() - 1);
    if points[i].x > x {
        i = 0;
    }
    while i + 1 < points.len() && points[i + 1].x < x {
        i += 1;
    }

    let a = points[i];
    let b = points[(i + 1).min(points.len() - 1)];
    Some((blend(a, b, x, method), i))
}

/// Interpolate the value at `x`
pub fn interpolate(points: &[Point], x: f64, method: InterpolationMethod) -> Option<f64> {
    interpolate_from(points, x, method, 0).map(|(value, _)| value)
}

/// Largest output a single `resample` call may produce
pub const MAX_RESAMPLE_POINTS: usize = 10_000_000;

/// Resample to evenly spaced points at `target_rate` Hz (x in milliseconds)
///
/// Fails when the span and rate together would exceed `MAX_RESAMPLE_POINTS`.
pub fn resample(
    points: &[Point],
    target_rate: f64,
    method: InterpolationMethod,
) -> AnalyticsResult<Vec<Point>> {
    if !target_rate.is_finite() || target_rate <= 0.0 {
        return Err(AnalyticsError::InvalidParameter(format!(
            "targetRate must be a positive number, got {}",
            target_rate
        )));
    }

    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Ok(Vec::new()),
    };
    if points.len() == 1 {
        return Ok(vec![first]);
    }

    let interval = 1000.0 / target_rate;
    let steps = ((last.x - first.x) / interval).floor().max(0.0);
    if !steps.is_finite() || steps >= MAX_RESAMPLE_POINTS as f64 {
        return Err(AnalyticsError::InvalidParameter(format!(
            "targetRate {} over a span of {} ms exceeds {} points",
            target_rate,
            last.x - first.x,
            MAX_RESAMPLE_POINTS
        )));
    }
    let count = steps as usize + 1;

    let mut result = Vec::with_capacity(count);
    let mut cursor = 0;
    for i in 0..count {
        let x = first.x + i as f64 * interval;
        if let Some((y, bracket)) = interpolate_from(points, x, method, cursor) {
            cursor = bracket;
            result.push(Point::new(x, y));
        }
    }

    Ok(result)
}
