// Analytics dispatcher
//
// Parses wire requests into `AnalyticsTask`, runs the matching handler and
// folds every failure (unknown task, bad payload, handler error, panic) into
// an error response keyed by the request id.

use super::types::{AnalyticsRequest, AnalyticsResponse, AnalyticsTask, TaskOutput};
use super::{aggregate, anomaly, correlation, smoothing, spectral, stats};
use crate::decimation::{self, DecimationAlgorithm};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::resample;
use std::panic::{self, AssertUnwindSafe};

/// Stateless task dispatcher
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run a typed task
    pub fn execute(&self, task: &AnalyticsTask) -> AnalyticsResult<TaskOutput> {
        match task {
            AnalyticsTask::Decimate(p) => {
                let points = match p.algorithm {
                    DecimationAlgorithm::Lttb => decimation::lttb(&p.data, p.target_points),
                    DecimationAlgorithm::NthPoint => {
                        decimation::nth_point(&p.data, p.target_points)
                    }
                    DecimationAlgorithm::DouglasPeucker => {
                        if p.data.len() <= p.target_points {
                            p.data.clone()
                        } else {
                            decimation::douglas_peucker(&p.data, p.epsilon)
                        }
                    }
                    DecimationAlgorithm::Visvalingam => {
                        decimation::visvalingam(&p.data, p.target_points)
                    }
                };
                Ok(TaskOutput::Points(points))
            }
            AnalyticsTask::Aggregate(p) => {
                aggregate::aggregate(&p.data, p.window_size, p.method, p.overlap)
                    .map(TaskOutput::Series)
            }
            AnalyticsTask::DetectAnomalies(p) => {
                anomaly::detect(&p.data, p.method, p.threshold, p.window_size)
                    .map(TaskOutput::Anomalies)
            }
            AnalyticsTask::CalculateStats(p) => {
                stats::calculate(&p.data, p.metrics.as_deref(), &p.percentiles)
                    .map(TaskOutput::Stats)
            }
            AnalyticsTask::Fft(p) => {
                spectral::spectrum(&p.data, p.sample_rate).map(TaskOutput::Spectrum)
            }
            AnalyticsTask::Resample(p) => {
                resample::resample(&p.data, p.target_rate, p.method).map(TaskOutput::Points)
            }
            AnalyticsTask::Smooth(p) => {
                smoothing::smooth(&p.data, p.method, p.window_size, p.alpha, p.sigma)
                    .map(TaskOutput::Series)
            }
            AnalyticsTask::Correlate(p) => {
                correlation::correlate(&p.x, &p.y, p.method, p.lag).map(TaskOutput::Correlation)
            }
        }
    }

    /// Parse and run a wire task, converting handler panics into errors
    pub fn run(&self, task: &str, data: serde_json::Value) -> AnalyticsResult<serde_json::Value> {
        let task = AnalyticsTask::from_wire(task, data)?;
        let kind = task.kind();

        let output = panic::catch_unwind(AssertUnwindSafe(|| self.execute(&task)))
            .map_err(|payload| AnalyticsError::HandlerPanicked {
                task: kind.name().to_string(),
                message: panic_message(payload.as_ref()),
            })??;

        serde_json::to_value(&output).map_err(|e| {
            AnalyticsError::Computation(format!("failed to encode {} result: {}", kind, e))
        })
    }

    /// Handle one request; never fails, errors become `{ id, error }`
    pub fn handle(&self, request: AnalyticsRequest) -> AnalyticsResponse {
        let AnalyticsRequest { id, task, data } = request;
        match self.run(&task, data) {
            Ok(value) => AnalyticsResponse::result(id, value),
            Err(e) => {
                log::error!("Analytics request {} ({}) failed: {}", id, task, e);
                AnalyticsResponse::error(id, e.to_string())
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(id: &str, task: &str, data: serde_json::Value) -> AnalyticsRequest {
        AnalyticsRequest::new(id, task, data)
    }

    #[test]
    fn test_aggregate_request() {
        let engine = AnalyticsEngine::new();
        let response = engine.handle(request(
            "agg-1",
            "aggregate",
            json!({"data": [1, 2, 3, 4, 5, 6], "windowSize": 3, "method": "mean"}),
        ));
        assert_eq!(response.id, "agg-1");
        assert_eq!(response.result_value(), Some(&json!([2.0, 5.0])));
    }

    #[test]
    fn test_unknown_task() {
        let response = AnalyticsEngine::new().handle(request("x", "bogus", json!({})));
        assert_eq!(response.id, "x");
        assert_eq!(response.error_message(), Some("Unknown task: bogus"));
    }

    #[test]
    fn test_invalid_payload() {
        let response =
            AnalyticsEngine::new().handle(request("p", "fft", json!({"sampleRate": 2.0})));
        let message = response.error_message().unwrap();
        assert!(message.starts_with("Invalid payload for fft:"), "{}", message);
    }

    #[test]
    fn test_handler_error_becomes_response() {
        let response = AnalyticsEngine::new().handle(request(
            "z",
            "aggregate",
            json!({"data": [1.0], "windowSize": 0, "method": "sum"}),
        ));
        assert!(response.is_error());
        assert!(response.error_message().unwrap().contains("windowSize"));
    }

    #[test]
    fn test_decimate_noop_when_small() {
        let data = json!([{"x": 0.0, "y": 1.0}, {"x": 1.0, "y": 2.0}, {"x": 2.0, "y": 0.0}]);
        for algorithm in ["lttb", "nth-point", "douglas-peucker", "visvalingam"] {
            let response = AnalyticsEngine::new().handle(request(
                algorithm,
                "decimate",
                json!({"data": data, "algorithm": algorithm, "targetPoints": 3, "epsilon": 100.0}),
            ));
            assert_eq!(response.result_value(), Some(&data), "{}", algorithm);
        }
    }

    #[test]
    fn test_stats_result_shape() {
        let value = AnalyticsEngine::new()
            .run(
                "calculateStats",
                json!({"data": [1.0, 2.0, 3.0, 4.0], "metrics": ["median", "percentiles"], "percentiles": [50]}),
            )
            .unwrap();
        assert_eq!(value, json!({"count": 4, "median": 2.5, "percentiles": {"50": 2.5}}));
    }

    #[test]
    fn test_correlate_result_shape() {
        let value = AnalyticsEngine::new()
            .run("correlate", json!({"x": [1, 2, 3], "y": [2, 4, 6]}))
            .unwrap();
        assert_eq!(value["method"], json!("pearson"));
        assert_eq!(value["lag"], json!(0));
        assert_eq!(value["n"], json!(3));
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload = panic::catch_unwind(|| panic!("boom {}", 7)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom 7");
    }
}
