use super::types::{CorrelationMethod, CorrelationReport};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::kernels;

/// Correlate `x` against `y` shifted by `lag`
pub fn correlate(
    x: &[f64],
    y: &[f64],
    method: CorrelationMethod,
    lag: i64,
) -> AnalyticsResult<CorrelationReport> {
    let (x, y) = align(x, y, lag);
    if x.len() < 2 {
        return Err(AnalyticsError::Computation(format!(
            "correlation needs at least two aligned pairs, got {} at lag {}",
            x.len(),
            lag
        )));
    }

    let coefficient = match method {
        CorrelationMethod::Pearson => pearson(x, y)?,
        CorrelationMethod::Spearman => pearson(&kernels::rank(x), &kernels::rank(y))?,
        CorrelationMethod::Kendall => kendall_tau_a(x, y),
    };

    Ok(CorrelationReport {
        coefficient,
        method,
        lag,
        n: x.len(),
    })
}

/// Drop the leading `lag` samples of `y` (or `|lag|` of `x` when negative),
/// then truncate both to the shorter length
fn align<'a>(x: &'a [f64], y: &'a [f64], lag: i64) -> (&'a [f64], &'a [f64]) {
    let shift = usize::try_from(lag.unsigned_abs()).unwrap_or(usize::MAX);
    let (x, y) = if lag >= 0 {
        (x, y.get(shift..).unwrap_or(&[]))
    } else {
        (x.get(shift..).unwrap_or(&[]), y)
    };
    let n = x.len().min(y.len());
    (&x[..n], &y[..n])
}

fn pearson(x: &[f64], y: &[f64]) -> AnalyticsResult<f64> {
    let mx = kernels::mean(x);
    let my = kernels::mean(y);

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Err(AnalyticsError::Computation(
            "correlation is undefined for a constant series".to_string(),
        ));
    }

    Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Kendall tau-a: `(concordant - discordant) / (n (n - 1) / 2)`; ties count
/// as neither
fn kendall_tau_a(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    let mut balance: i64 = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i].partial_cmp(&x[j]);
            let dy = y[i].partial_cmp(&y[j]);
            match (dx, dy) {
                (Some(a), Some(b)) if a.is_ne() && b.is_ne() => {
                    balance += if a == b { 1 } else { -1 };
                }
                _ => {}
            }
        }
    }
    let pairs = (n * (n - 1) / 2) as f64;
    balance as f64 / pairs
}
