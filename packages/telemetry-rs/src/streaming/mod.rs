// Streaming time-series buffer
//
// Producers push samples (single or batched, possibly out of order); the buffer
// keeps them sorted by timestamp, enforces time-window and capacity retention,
// compresses bulk backfills with LTTB, and answers range, interpolation and
// bucket-aggregation queries for rendering.
//
// Architecture:
// - `types`: configuration, interpolation/aggregation modes, statistics
// - `clock`: time source used by the retention window
// - `buffer`: the sorted sample store itself

pub mod buffer;
pub mod clock;
pub mod types;

pub use buffer::StreamingBuffer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use types::{
    AggregatedBucket, AggregationMode, BufferConfig, BufferStatistics, InterpolationMode,
};
