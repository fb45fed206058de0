use super::types::{StatMetric, StatsReport};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::kernels;
use std::collections::BTreeMap;

/// Descriptive statistics for `data`
///
/// `metrics` selects the fields to fill; `None` computes all of them.
pub fn calculate(
    data: &[f64],
    metrics: Option<&[StatMetric]>,
    percentiles: &[f64],
) -> AnalyticsResult<StatsReport> {
    if data.is_empty() {
        return Err(AnalyticsError::InvalidParameter(
            "calculateStats requires at least one value".to_string(),
        ));
    }

    let metrics = metrics.unwrap_or(&StatMetric::ALL);
    let wants = |metric: StatMetric| metrics.contains(&metric);

    let mut report = StatsReport {
        count: data.len(),
        ..Default::default()
    };

    if wants(StatMetric::Mean) {
        report.mean = Some(kernels::mean(data));
    }
    if wants(StatMetric::Median) {
        report.median = Some(kernels::median(data));
    }
    if wants(StatMetric::Stddev) {
        report.stddev = Some(kernels::stddev(data));
    }
    if wants(StatMetric::Variance) {
        report.variance = Some(kernels::variance(data));
    }
    if wants(StatMetric::Skewness) {
        report.skewness = Some(kernels::skewness(data));
    }
    if wants(StatMetric::Kurtosis) {
        report.kurtosis = Some(kernels::kurtosis(data));
    }
    if wants(StatMetric::Percentiles) {
        report.percentiles = Some(percentile_table(data, percentiles)?);
    }

    Ok(report)
}

fn percentile_table(data: &[f64], percentiles: &[f64]) -> AnalyticsResult<BTreeMap<String, f64>> {
    let sorted = kernels::sorted(data);
    percentiles
        .iter()
        .map(|&p| {
            if !(0.0..=100.0).contains(&p) {
                return Err(AnalyticsError::InvalidParameter(format!(
                    "percentile {} is outside [0, 100]",
                    p
                )));
            }
            Ok((p.to_string(), kernels::percentile_sorted(&sorted, p)))
        })
        .collect()
}
