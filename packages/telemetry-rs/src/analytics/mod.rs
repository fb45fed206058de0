// Offline analytics engine
//
// Stateless, request/response computation over finite numeric series. A
// request names one task; the engine parses it into `AnalyticsTask`, runs the
// pure handler and answers with `{ id, result }` or `{ id, error }`.
// `AnalyticsWorker` hosts an engine on its own thread behind bounded channels.

pub mod aggregate;
pub mod anomaly;
pub mod correlation;
pub mod engine;
pub mod smoothing;
pub mod spectral;
pub mod stats;
pub mod types;
pub mod worker;

pub use engine::AnalyticsEngine;
pub use types::{
    AggregateMethod, AggregateParams, AnalyticsRequest, AnalyticsResponse, AnalyticsTask,
    Anomaly, AnomalyMethod, AnomalyParams, CorrelateParams, CorrelationMethod,
    CorrelationReport, DecimateParams, FftParams, ResampleParams, SmoothParams,
    SmoothingMethod, Spectrum, StatMetric, StatsParams, StatsReport, TaskKind, TaskOutcome,
    TaskOutput,
};
pub use worker::{AnalyticsWorker, WorkerConfig};
