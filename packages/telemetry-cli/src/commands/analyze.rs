use crate::cli::AnalyzeArgs;
use crate::exit_codes;
use crate::output;
use telemetry_rs::{AnalyticsRequest, AnalyticsResponse, AnalyticsWorker, WorkerConfig};

/// Parsed request file: a single request answers with a single response
enum RequestBatch {
    Single(AnalyticsRequest),
    Many(Vec<AnalyticsRequest>),
}

fn parse_requests(input: &str) -> Result<RequestBatch, String> {
    let value: serde_json::Value =
        serde_json::from_str(input).map_err(|e| format!("Malformed JSON input: {}", e))?;

    if value.is_array() {
        serde_json::from_value(value)
            .map(RequestBatch::Many)
            .map_err(|e| format!("Invalid request array: {}", e))
    } else {
        serde_json::from_value(value)
            .map(RequestBatch::Single)
            .map_err(|e| format!("Invalid request: {}", e))
    }
}

/// Push every request through one worker, keeping at most `queue_capacity`
/// unanswered so neither channel can fill up
async fn run_requests(
    requests: Vec<AnalyticsRequest>,
    queue_capacity: usize,
) -> Result<Vec<AnalyticsResponse>, String> {
    let config = WorkerConfig {
        request_capacity: queue_capacity,
        response_capacity: queue_capacity,
    };
    let mut worker = AnalyticsWorker::spawn(config).map_err(|e| e.to_string())?;
    log::info!("Submitting {} requests to {}", requests.len(), worker.name());

    let mut responses = Vec::with_capacity(requests.len());
    let mut in_flight = 0usize;
    for request in requests {
        worker.send(request).await.map_err(|e| e.to_string())?;
        in_flight += 1;
        if in_flight == queue_capacity {
            match worker.recv().await {
                Some(response) => responses.push(response),
                None => return Err("Analytics worker stopped unexpectedly".to_string()),
            }
            in_flight -= 1;
        }
    }

    responses.extend(worker.shutdown().await.map_err(|e| e.to_string())?);
    Ok(responses)
}

pub async fn execute(args: AnalyzeArgs) -> i32 {
    if args.queue_capacity == 0 {
        eprintln!("Error: --queue-capacity must be at least 1");
        return exit_codes::INPUT_ERROR;
    }

    let input = match output::read_input(args.input.as_deref()) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let batch = match parse_requests(&input) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let (requests, single) = match batch {
        RequestBatch::Single(request) => (vec![request], true),
        RequestBatch::Many(requests) => (requests, false),
    };

    let responses = match run_requests(requests, args.queue_capacity).await {
        Ok(responses) => responses,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    };

    let failures = responses.iter().filter(|r| r.is_error()).count();
    if failures > 0 {
        log::warn!("{} of {} requests failed", failures, responses.len());
    }

    let written = match (single, responses.first()) {
        (true, Some(response)) => output::emit(response, args.compact, args.output.as_deref()),
        _ => output::emit(&responses, args.compact, args.output.as_deref()),
    };
    if let Err(e) = written {
        eprintln!("Error: {}", e);
        return exit_codes::EXECUTION_ERROR;
    }

    if failures > 0 {
        exit_codes::PARTIAL_FAILURE
    } else {
        exit_codes::SUCCESS
    }
}
