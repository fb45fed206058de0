use crate::cli::ReplayArgs;
use crate::exit_codes;
use crate::output;
use serde::Serialize;
use telemetry_rs::{
    AggregatedBucket, BufferConfig, BufferStatistics, ManualClock, Sample, StreamingBuffer,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayReport {
    ingested: usize,
    statistics: BufferStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    buckets: Option<Vec<AggregatedBucket>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest: Option<Vec<Sample>>,
}

fn buffer_config(args: &ReplayArgs) -> BufferConfig {
    BufferConfig {
        capacity: args.capacity,
        window_size: args.window_ms,
        compression_threshold: args.compression_threshold,
        interpolation: args.interpolation,
        aggregation: args.aggregation,
    }
}

/// Replay samples in file order; the clock follows the newest timestamp seen
fn replay(
    buffer: &mut StreamingBuffer,
    clock: &ManualClock,
    samples: Vec<Sample>,
    batch_size: usize,
) {
    if batch_size <= 1 {
        for sample in samples {
            clock.advance_to(sample.timestamp);
            buffer.push(sample);
        }
        return;
    }

    let mut samples = samples.into_iter().peekable();
    while samples.peek().is_some() {
        let chunk: Vec<Sample> = samples.by_ref().take(batch_size).collect();
        if let Some(newest) = chunk.iter().map(|s| s.timestamp).max() {
            clock.advance_to(newest);
        }
        log::debug!("Ingesting batch of {} samples", chunk.len());
        buffer.push_batch(chunk);
    }
}

pub fn execute(args: ReplayArgs) -> i32 {
    let input = match output::read_input(Some(&args.input)) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let samples: Vec<Sample> = match serde_json::from_str(&input) {
        Ok(samples) => samples,
        Err(e) => {
            eprintln!("Error: Invalid sample file '{}': {}", args.input, e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let clock = ManualClock::new(i64::MIN);
    let mut buffer = match StreamingBuffer::with_clock(buffer_config(&args), clock.clone()) {
        Ok(buffer) => buffer,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let ingested = samples.len();
    log::info!("Replaying {} samples from {}", ingested, args.input);
    replay(&mut buffer, &clock, samples, args.batch_size);

    let report = ReplayReport {
        ingested,
        statistics: buffer.get_statistics(),
        buckets: args
            .bucket_ms
            .map(|size| buffer.get_aggregated_buckets(size, None, None)),
        latest: args.latest.map(|n| buffer.get_latest(n)),
    };

    if let Err(e) = output::emit(&report, args.compact, args.output.as_deref()) {
        eprintln!("Error: {}", e);
        return exit_codes::EXECUTION_ERROR;
    }

    exit_codes::SUCCESS
}
