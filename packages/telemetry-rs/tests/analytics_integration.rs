//! End-to-end analytics scenarios over the JSON protocol

use proptest::prelude::*;
use serde_json::json;
use telemetry_rs::{AnalyticsEngine, AnalyticsRequest, AnalyticsWorker, TaskKind, WorkerConfig};

fn run(task: &str, data: serde_json::Value) -> serde_json::Value {
    let response = AnalyticsEngine::new().handle(AnalyticsRequest::new("t", task, data));
    match response.result_value() {
        Some(value) => value.clone(),
        None => panic!("{} failed: {:?}", task, response.error_message()),
    }
}

#[test]
fn aggregate_tumbling_mean() {
    let result = run(
        "aggregate",
        json!({"data": [1, 2, 3, 4, 5, 6], "windowSize": 3, "method": "mean"}),
    );
    assert_eq!(result, json!([2.0, 5.0]));
}

#[test]
fn zscore_flags_single_spike() {
    let mut data: Vec<f64> = (0..200).map(|i| ((i * 7) % 5) as f64 - 2.0).collect();
    data[150] = 40.0;

    let result = run("detectAnomalies", json!({"data": data}));
    let anomalies = result.as_array().unwrap();
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0]["index"], json!(150));
    assert_eq!(anomalies[0]["value"], json!(40.0));
}

#[test]
fn zscore_flags_spike_in_constant_stream() {
    let mut data = vec![10.0; 100];
    data[40] = 55.0;

    let result = run("detectAnomalies", json!({"data": data, "method": "zscore"}));
    let anomalies = result.as_array().unwrap();
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0]["index"], json!(40));
    assert_eq!(anomalies[0]["value"], json!(55.0));
}

#[test]
fn oversized_requests_fail_without_aborting() {
    let engine = AnalyticsEngine::new();

    let smooth = engine.handle(AnalyticsRequest::new(
        "wide-kernel",
        "smooth",
        json!({"data": [1, 2, 3], "method": "gaussian", "windowSize": 10_000_000_000_000u64}),
    ));
    assert_eq!(smooth.result_value().unwrap().as_array().unwrap().len(), 3);

    let resample = engine.handle(AnalyticsRequest::new(
        "wide-span",
        "resample",
        json!({"data": [{"x": 0, "y": 0}, {"x": 1.7e15, "y": 1}], "targetRate": 1000}),
    ));
    assert!(resample
        .error_message()
        .unwrap()
        .starts_with("Invalid parameter"));
}

#[test]
fn unknown_task_is_reported_by_id() {
    let response =
        AnalyticsEngine::new().handle(AnalyticsRequest::new("req-9", "bogus", json!({})));
    let wire = serde_json::to_value(&response).unwrap();
    assert_eq!(wire, json!({"id": "req-9", "error": "Unknown task: bogus"}));
}

#[test]
fn decimate_lttb_to_target() {
    let data: Vec<_> = (0..1_000)
        .map(|i| json!({"x": i as f64, "y": (i as f64 / 25.0).sin()}))
        .collect();
    let result = run(
        "decimate",
        json!({"data": data, "algorithm": "lttb", "targetPoints": 100}),
    );
    let points = result.as_array().unwrap();
    assert_eq!(points.len(), 100);
    assert_eq!(points[0]["x"], json!(0.0));
    assert_eq!(points[99]["x"], json!(999.0));
}

#[test]
fn resample_to_target_rate() {
    let result = run(
        "resample",
        json!({
            "data": [{"x": 0, "y": 0}, {"x": 100, "y": 10}],
            "targetRate": 20,
        }),
    );
    // 20 Hz over 100 ms -> points every 50 ms
    assert_eq!(
        result,
        json!([{"x": 0.0, "y": 0.0}, {"x": 50.0, "y": 5.0}, {"x": 100.0, "y": 10.0}])
    );
}

#[test]
fn every_task_kind_is_dispatchable() {
    let engine = AnalyticsEngine::new();
    for kind in TaskKind::ALL {
        let response = engine.handle(AnalyticsRequest::new(kind.name(), kind.name(), json!({})));
        // empty payloads fail validation, but never as an unknown task
        if let Some(message) = response.error_message() {
            assert!(!message.starts_with("Unknown task"), "{}", message);
        }
    }
}

#[tokio::test]
async fn worker_serves_mixed_requests() {
    let mut worker = AnalyticsWorker::spawn(WorkerConfig::default()).unwrap();

    let stats = worker
        .request("calculateStats", json!({"data": [2, 4, 4, 4, 5, 5, 7, 9], "metrics": ["mean"]}))
        .await
        .unwrap();
    assert_eq!(stats.result_value(), Some(&json!({"count": 8, "mean": 5.0})));

    let failed = worker
        .request(
            "smooth",
            json!({"data": [1.0], "method": "exponential", "alpha": 2.0}),
        )
        .await
        .unwrap();
    assert!(failed.is_error());

    worker.shutdown().await.unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Pearson correlation of a non-constant series with itself is 1
    #[test]
    fn pearson_self_correlation(data in prop::collection::vec(-1e3f64..1e3, 2..100)) {
        prop_assume!(data.iter().any(|&v| (v - data[0]).abs() > 1e-6));
        let result = run("correlate", json!({"x": data, "y": data}));
        let coefficient = result["coefficient"].as_f64().unwrap();
        prop_assert!((coefficient - 1.0).abs() < 1e-9, "coefficient {}", coefficient);
    }

    /// The engine answers every request, whatever the payload
    #[test]
    fn engine_never_panics(
        task in prop::sample::select(vec!["aggregate", "smooth", "fft", "detectAnomalies", "nope"]),
        data in prop::collection::vec(-1e6f64..1e6, 0..50),
        window in 0usize..10,
    ) {
        let response = AnalyticsEngine::new().handle(AnalyticsRequest::new(
            "p",
            task,
            json!({"data": data, "windowSize": window, "method": "mean"}),
        ));
        prop_assert_eq!(response.id, "p");
    }
}
