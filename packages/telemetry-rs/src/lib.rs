//! Real-time telemetry streaming and analytics
//!
//! Two cooperating halves:
//!
//! - [`streaming::StreamingBuffer`]: a bounded, time-windowed, timestamp-ordered
//!   sample store with out-of-order ingestion, LTTB compression and
//!   interpolation/bucket queries for rendering.
//! - [`analytics::AnalyticsEngine`]: stateless request/response analytics
//!   (decimation, aggregation, anomaly detection, statistics, spectra,
//!   resampling, smoothing, correlation), optionally hosted on an
//!   [`analytics::AnalyticsWorker`] thread.
//!
//! ```no_run
//! use telemetry_rs::{BufferConfig, Sample, StreamingBuffer};
//!
//! let mut buffer = StreamingBuffer::new(BufferConfig::with_capacity(1_000))?;
//! buffer.push(Sample::new(1_000, 1.5));
//! let stats = buffer.get_statistics();
//! # Ok::<(), telemetry_rs::BufferError>(())
//! ```

pub mod analytics;
pub mod decimation;
pub mod error;
pub mod kernels;
pub mod resample;
pub mod streaming;
pub mod types;

pub use analytics::{
    AnalyticsEngine, AnalyticsRequest, AnalyticsResponse, AnalyticsTask, AnalyticsWorker,
    TaskKind, WorkerConfig,
};
pub use decimation::DecimationAlgorithm;
pub use error::{
    AnalyticsError, AnalyticsResult, BufferError, BufferResult, WorkerError, WorkerResult,
};
pub use resample::InterpolationMethod;
pub use streaming::{
    AggregatedBucket, AggregationMode, BufferConfig, BufferStatistics, Clock, InterpolationMode,
    ManualClock, StreamingBuffer, SystemClock,
};
pub use types::{Point, Sample, SampleValue};
