// Request/response protocol and task payloads for the analytics engine

use crate::decimation::DecimationAlgorithm;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::resample::InterpolationMethod;
use crate::types::Point;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Wire protocol
// ============================================================================

/// `{ id, task, data }` as sent by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRequest {
    /// Caller-chosen correlation token, unique per outstanding request
    pub id: String,
    pub task: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl AnalyticsRequest {
    pub fn new(id: impl Into<String>, task: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            task: task.into(),
            data,
        }
    }

    /// Build a request for a typed task under a fresh random id
    pub fn from_task(task: &AnalyticsTask) -> AnalyticsResult<Self> {
        let (name, data) = task.to_wire()?;
        Ok(Self::new(uuid::Uuid::new_v4().to_string(), name, data))
    }
}

/// Exactly one of `result` or `error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOutcome {
    Result(serde_json::Value),
    Error(String),
}

/// `{ id, result }` or `{ id, error }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub id: String,
    #[serde(flatten)]
    pub outcome: TaskOutcome,
}

impl AnalyticsResponse {
    pub fn result(id: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            outcome: TaskOutcome::Result(value),
        }
    }

    pub fn error(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: TaskOutcome::Error(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Error(_))
    }

    pub fn result_value(&self) -> Option<&serde_json::Value> {
        match &self.outcome {
            TaskOutcome::Result(value) => Some(value),
            TaskOutcome::Error(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            TaskOutcome::Result(_) => None,
            TaskOutcome::Error(message) => Some(message),
        }
    }
}

// ============================================================================
// Task catalogue
// ============================================================================

/// Names of the supported tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Decimate,
    Aggregate,
    DetectAnomalies,
    CalculateStats,
    Fft,
    Resample,
    Smooth,
    Correlate,
}

impl TaskKind {
    pub const ALL: [TaskKind; 8] = [
        TaskKind::Decimate,
        TaskKind::Aggregate,
        TaskKind::DetectAnomalies,
        TaskKind::CalculateStats,
        TaskKind::Fft,
        TaskKind::Resample,
        TaskKind::Smooth,
        TaskKind::Correlate,
    ];

    /// Wire name
    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Decimate => "decimate",
            TaskKind::Aggregate => "aggregate",
            TaskKind::DetectAnomalies => "detectAnomalies",
            TaskKind::CalculateStats => "calculateStats",
            TaskKind::Fft => "fft",
            TaskKind::Resample => "resample",
            TaskKind::Smooth => "smooth",
            TaskKind::Correlate => "correlate",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            TaskKind::Decimate => "Reduce point count (lttb, nth-point, douglas-peucker, visvalingam)",
            TaskKind::Aggregate => "Sliding window reduction (mean, median, min, max, sum, stddev)",
            TaskKind::DetectAnomalies => "Rolling-window outlier scoring (zscore, iqr, mad)",
            TaskKind::CalculateStats => "Descriptive statistics and percentiles",
            TaskKind::Fft => "One-sided DFT magnitude and phase spectrum",
            TaskKind::Resample => "Evenly spaced points at a target rate (linear, nearest, cubic)",
            TaskKind::Smooth => "Moving-average, exponential, gaussian or savitzky-golay smoothing",
            TaskKind::Correlate => "Pearson, spearman or kendall correlation with optional lag",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed analytics task; the closed set of operations the engine runs
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsTask {
    Decimate(DecimateParams),
    Aggregate(AggregateParams),
    DetectAnomalies(AnomalyParams),
    CalculateStats(StatsParams),
    Fft(FftParams),
    Resample(ResampleParams),
    Smooth(SmoothParams),
    Correlate(CorrelateParams),
}

fn parse_payload<T: DeserializeOwned>(kind: TaskKind, data: serde_json::Value) -> AnalyticsResult<T> {
    serde_json::from_value(data).map_err(|e| AnalyticsError::InvalidPayload {
        task: kind.name().to_string(),
        message: e.to_string(),
    })
}

impl AnalyticsTask {
    /// Parse a wire task name and payload
    pub fn from_wire(task: &str, data: serde_json::Value) -> AnalyticsResult<Self> {
        let kind = TaskKind::from_name(task)
            .ok_or_else(|| AnalyticsError::UnknownTask(task.to_string()))?;

        Ok(match kind {
            TaskKind::Decimate => Self::Decimate(parse_payload(kind, data)?),
            TaskKind::Aggregate => Self::Aggregate(parse_payload(kind, data)?),
            TaskKind::DetectAnomalies => Self::DetectAnomalies(parse_payload(kind, data)?),
            TaskKind::CalculateStats => Self::CalculateStats(parse_payload(kind, data)?),
            TaskKind::Fft => Self::Fft(parse_payload(kind, data)?),
            TaskKind::Resample => Self::Resample(parse_payload(kind, data)?),
            TaskKind::Smooth => Self::Smooth(parse_payload(kind, data)?),
            TaskKind::Correlate => Self::Correlate(parse_payload(kind, data)?),
        })
    }

    /// Wire name and payload for this task
    pub fn to_wire(&self) -> AnalyticsResult<(&'static str, serde_json::Value)> {
        let data = match self {
            Self::Decimate(p) => serde_json::to_value(p),
            Self::Aggregate(p) => serde_json::to_value(p),
            Self::DetectAnomalies(p) => serde_json::to_value(p),
            Self::CalculateStats(p) => serde_json::to_value(p),
            Self::Fft(p) => serde_json::to_value(p),
            Self::Resample(p) => serde_json::to_value(p),
            Self::Smooth(p) => serde_json::to_value(p),
            Self::Correlate(p) => serde_json::to_value(p),
        }
        .map_err(|e| AnalyticsError::InvalidPayload {
            task: self.kind().name().to_string(),
            message: e.to_string(),
        })?;
        Ok((self.kind().name(), data))
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Decimate(_) => TaskKind::Decimate,
            Self::Aggregate(_) => TaskKind::Aggregate,
            Self::DetectAnomalies(_) => TaskKind::DetectAnomalies,
            Self::CalculateStats(_) => TaskKind::CalculateStats,
            Self::Fft(_) => TaskKind::Fft,
            Self::Resample(_) => TaskKind::Resample,
            Self::Smooth(_) => TaskKind::Smooth,
            Self::Correlate(_) => TaskKind::Correlate,
        }
    }
}

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecimateParams {
    pub data: Vec<Point>,
    #[serde(default = "default_algorithm")]
    pub algorithm: DecimationAlgorithm,
    pub target_points: usize,
    /// Tolerance for douglas-peucker; ignored by the count-driven algorithms
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

fn default_algorithm() -> DecimationAlgorithm {
    DecimationAlgorithm::Lttb
}
fn default_epsilon() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateMethod {
    #[default]
    Mean,
    Median,
    Min,
    Max,
    Sum,
    Stddev,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateParams {
    pub data: Vec<f64>,
    pub window_size: usize,
    #[serde(default)]
    pub method: AggregateMethod,
    #[serde(default)]
    pub overlap: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyMethod {
    #[default]
    Zscore,
    Iqr,
    Mad,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyParams {
    pub data: Vec<f64>,
    #[serde(default)]
    pub method: AnomalyMethod,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_anomaly_window")]
    pub window_size: usize,
}

fn default_threshold() -> f64 {
    3.0
}
fn default_anomaly_window() -> usize {
    50
}

/// A flagged sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub index: usize,
    pub value: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatMetric {
    Mean,
    Median,
    Stddev,
    Variance,
    Skewness,
    Kurtosis,
    Percentiles,
}

impl StatMetric {
    pub const ALL: [StatMetric; 7] = [
        StatMetric::Mean,
        StatMetric::Median,
        StatMetric::Stddev,
        StatMetric::Variance,
        StatMetric::Skewness,
        StatMetric::Kurtosis,
        StatMetric::Percentiles,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsParams {
    pub data: Vec<f64>,
    /// Subset to compute; all metrics when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<StatMetric>>,
    #[serde(default = "default_percentiles")]
    pub percentiles: Vec<f64>,
}

fn default_percentiles() -> Vec<f64> {
    vec![25.0, 50.0, 75.0, 90.0, 95.0, 99.0]
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stddev: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skewness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kurtosis: Option<f64>,
    /// Keyed by the requested percentile, e.g. "95"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentiles: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FftParams {
    pub data: Vec<f64>,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,
}

fn default_sample_rate() -> f64 {
    1.0
}

/// One-sided spectrum, bins `0..n/2`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub magnitudes: Vec<f64>,
    pub phases: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResampleParams {
    pub data: Vec<Point>,
    /// Output rate in Hz; x is in milliseconds
    pub target_rate: f64,
    #[serde(default)]
    pub method: InterpolationMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmoothingMethod {
    #[default]
    MovingAverage,
    Exponential,
    Gaussian,
    /// Currently delegates to the moving average
    SavitzkyGolay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothParams {
    pub data: Vec<f64>,
    #[serde(default)]
    pub method: SmoothingMethod,
    #[serde(default = "default_smoothing_window")]
    pub window_size: usize,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_sigma")]
    pub sigma: f64,
}

fn default_smoothing_window() -> usize {
    5
}
fn default_alpha() -> f64 {
    0.3
}
fn default_sigma() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
    Kendall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelateParams {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(default)]
    pub method: CorrelationMethod,
    /// Positive lag drops leading samples of `y`, negative lag of `x`
    #[serde(default)]
    pub lag: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub coefficient: f64,
    pub method: CorrelationMethod,
    pub lag: i64,
    /// Number of aligned pairs compared
    pub n: usize,
}

/// Typed output of a task, serialized as the response's `result`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskOutput {
    Points(Vec<Point>),
    Series(Vec<f64>),
    Anomalies(Vec<Anomaly>),
    Stats(StatsReport),
    Spectrum(Spectrum),
    Correlation(CorrelationReport),
}
