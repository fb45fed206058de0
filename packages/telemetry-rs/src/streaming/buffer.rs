// Sorted, bounded sample store for a single telemetry stream
//
// Single-owner and single-threaded: the buffer does no internal locking.
// Callers with several writers must serialize access themselves (one buffer
// per stream, one writer per buffer).

use super::clock::{Clock, SystemClock};
use super::types::{
    AggregatedBucket, AggregationMode, BufferConfig, BufferStatistics, InterpolationMode,
};
use crate::decimation::lttb_indices;
use crate::error::BufferResult;
use crate::types::{Point, Sample};

/// Share of the compression threshold kept after a compression pass
const COMPRESSION_TARGET_RATIO: f64 = 0.8;

/// Time-ordered sample buffer with retention, compression and queries
pub struct StreamingBuffer {
    samples: Vec<Sample>,
    config: BufferConfig,
    clock: Box<dyn Clock>,
    stats: BufferStatistics,
    compression_ratio: Option<f64>,
}

impl StreamingBuffer {
    /// Create a buffer that reads "now" from the wall clock
    pub fn new(config: BufferConfig) -> BufferResult<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// Create a buffer with an explicit time source for the retention window
    pub fn with_clock(config: BufferConfig, clock: impl Clock + 'static) -> BufferResult<Self> {
        config.validate()?;

        Ok(Self {
            samples: Vec::with_capacity(config.capacity.min(65_536)),
            config,
            clock: Box::new(clock),
            stats: BufferStatistics::default(),
            compression_ratio: None,
        })
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Insert one sample at its sorted position
    ///
    /// Samples sharing a timestamp keep their insertion order. Never compresses.
    pub fn push(&mut self, sample: Sample) {
        let pos = self
            .samples
            .partition_point(|s| s.timestamp <= sample.timestamp);
        self.samples.insert(pos, sample);

        self.trim_if_needed();
        self.update_statistics();
    }

    /// Merge an unsorted batch into the buffer in linear time
    pub fn push_batch(&mut self, mut batch: Vec<Sample>) {
        // Stable: equal timestamps keep their order within the batch
        batch.sort_by_key(|s| s.timestamp);

        let existing = std::mem::take(&mut self.samples);
        self.samples = merge_sorted(existing, batch);

        self.trim_if_needed();
        self.compress_if_needed();
        self.update_statistics();
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Samples with `start <= timestamp < end`
    pub fn get_range(&self, start: i64, end: i64) -> Vec<Sample> {
        if start >= end {
            return Vec::new();
        }
        let lo = self.samples.partition_point(|s| s.timestamp < start);
        let hi = self.samples.partition_point(|s| s.timestamp < end);
        self.samples[lo..hi.max(lo)].to_vec()
    }

    /// The last `min(n, len)` samples in chronological order
    pub fn get_latest(&self, n: usize) -> Vec<Sample> {
        let start = self.samples.len().saturating_sub(n);
        self.samples[start..].to_vec()
    }

    pub fn get_all(&self) -> Vec<Sample> {
        self.samples.clone()
    }

    pub fn get_statistics(&self) -> BufferStatistics {
        self.stats.clone()
    }

    /// LTTB-decimated view of the whole buffer for display
    pub fn get_display_data(&self, max_points: usize) -> Vec<Sample> {
        let points = self.projected_points();
        lttb_indices(&points, max_points)
            .into_iter()
            .map(|i| self.samples[i].clone())
            .collect()
    }

    /// Estimate the value at `timestamp` with the configured interpolation
    ///
    /// Returns `None` for an empty buffer or when the samples needed are not
    /// numeric. Timestamps outside the retained range clamp to the first or
    /// last sample.
    pub fn get_interpolated_value(&self, timestamp: i64) -> Option<f64> {
        let len = self.samples.len();
        if len == 0 {
            return None;
        }

        let after = self.samples.partition_point(|s| s.timestamp <= timestamp);
        if after == 0 {
            return self.samples[0].numeric_value();
        }

        let before = after - 1;
        if after == len || self.samples[before].timestamp == timestamp {
            return self.samples[before].numeric_value();
        }

        match self.config.interpolation {
            InterpolationMode::Step => self.samples[before].numeric_value(),
            InterpolationMode::Linear => self.linear_between(before, after, timestamp),
            InterpolationMode::Smooth => self
                .catmull_rom_between(before, after, timestamp)
                .or_else(|| self.linear_between(before, after, timestamp)),
        }
    }

    /// Reduce numeric samples in `[start, end]` into fixed-width buckets
    ///
    /// Buckets are anchored at `start` (default: oldest sample) and empty
    /// buckets are omitted. A zero `bucket_size` yields no buckets.
    pub fn get_aggregated_buckets(
        &self,
        bucket_size: u64,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Vec<AggregatedBucket> {
        if bucket_size == 0 {
            log::warn!("get_aggregated_buckets called with a zero bucket size");
            return Vec::new();
        }

        let (Some(first), Some(last)) = (self.samples.first(), self.samples.last()) else {
            return Vec::new();
        };
        let start = start.unwrap_or(first.timestamp);
        let end = end.unwrap_or(last.timestamp);
        if end < start {
            return Vec::new();
        }

        let lo = self.samples.partition_point(|s| s.timestamp < start);
        let hi = self.samples.partition_point(|s| s.timestamp <= end);
        // Offsets from a far-off start can exceed i64
        let width = i128::from(bucket_size);
        let bucket_start = |index: i128| -> i64 {
            i64::try_from(i128::from(start) + index * width).unwrap_or(start)
        };

        let mut buckets = Vec::new();
        let mut current: Option<(i128, BucketAccumulator)> = None;

        for sample in &self.samples[lo..hi.max(lo)] {
            let Some(value) = sample.numeric_value() else {
                continue;
            };
            let index = (i128::from(sample.timestamp) - i128::from(start)) / width;

            if let Some((bucket_index, acc)) = current.as_mut() {
                if *bucket_index == index {
                    acc.add(value);
                    continue;
                }
            }

            if let Some((bucket_index, acc)) = current.take() {
                buckets.push(acc.finish(bucket_start(bucket_index), self.config.aggregation));
            }
            current = Some((index, BucketAccumulator::new(value)));
        }

        if let Some((bucket_index, acc)) = current {
            buckets.push(acc.finish(bucket_start(bucket_index), self.config.aggregation));
        }

        buckets
    }

    // ------------------------------------------------------------------
    // Explicit maintenance
    // ------------------------------------------------------------------

    /// Remove every sample and reset statistics
    pub fn clear(&mut self) {
        self.samples.clear();
        self.compression_ratio = None;
        self.update_statistics();
    }

    /// Drop every sample older than `before_time`
    pub fn trim(&mut self, before_time: i64) {
        let drop = self.samples.partition_point(|s| s.timestamp < before_time);
        if drop > 0 {
            self.samples.drain(..drop);
            log::debug!("Trimmed {} samples older than {}", drop, before_time);
        }
        self.update_statistics();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Time window first, then capacity
    fn trim_if_needed(&mut self) {
        if self.config.window_size > 0 {
            let window = self.config.window_size as i64;
            let cutoff = self.clock.now_millis().saturating_sub(window);
            let expired = self.samples.partition_point(|s| s.timestamp < cutoff);
            if expired > 0 {
                self.samples.drain(..expired);
                log::debug!("Expired {} samples outside the {} ms window", expired, window);
            }
        }

        if self.samples.len() > self.config.capacity {
            let excess = self.samples.len() - self.config.capacity;
            self.samples.drain(..excess);
            log::debug!("Dropped {} oldest samples over capacity", excess);
        }
    }

    fn compress_if_needed(&mut self) {
        let Some(threshold) = self.config.compression_threshold else {
            return;
        };
        let original = self.samples.len();
        if original < threshold {
            return;
        }

        let target = (threshold as f64 * COMPRESSION_TARGET_RATIO).floor() as usize;
        if target == 0 {
            return;
        }

        let selected = lttb_indices(&self.projected_points(), target);
        if selected.len() >= original {
            return;
        }

        let mut keep = vec![false; original];
        for i in selected {
            keep[i] = true;
        }
        let mut flags = keep.into_iter();
        self.samples.retain(|_| flags.next().unwrap_or(false));

        let ratio = original as f64 / self.samples.len() as f64;
        self.compression_ratio = Some(ratio);
        log::debug!(
            "Compressed {} samples to {} (ratio {:.2})",
            original,
            self.samples.len(),
            ratio
        );
    }

    /// (timestamp, value) projection; samples without a numeric value score
    /// as zero for point selection only
    fn projected_points(&self) -> Vec<Point> {
        self.samples
            .iter()
            .map(|s| Point::new(s.timestamp as f64, s.numeric_value().unwrap_or(0.0)))
            .collect()
    }

    fn update_statistics(&mut self) {
        let count = self.samples.len();
        let oldest = self.samples.first().map(|s| s.timestamp);
        let newest = self.samples.last().map(|s| s.timestamp);

        let average_interval = match (oldest, newest) {
            (Some(oldest), Some(newest)) if count > 1 => {
                (newest - oldest) as f64 / (count - 1) as f64
            }
            _ => 0.0,
        };

        self.stats = BufferStatistics {
            count,
            oldest_timestamp: oldest,
            newest_timestamp: newest,
            average_interval,
            utilization: count as f64 / self.config.capacity as f64,
            compression_ratio: self.compression_ratio,
        };
    }

    fn linear_between(&self, before: usize, after: usize, timestamp: i64) -> Option<f64> {
        let a = &self.samples[before];
        let b = &self.samples[after];
        let (y0, y1) = (a.numeric_value()?, b.numeric_value()?);

        let span = (b.timestamp - a.timestamp) as f64;
        if span <= 0.0 {
            return Some(y0);
        }
        let u = (timestamp - a.timestamp) as f64 / span;
        Some(y0 + (y1 - y0) * u)
    }

    fn catmull_rom_between(&self, before: usize, after: usize, timestamp: i64) -> Option<f64> {
        if before == 0 || after + 1 >= self.samples.len() {
            return None;
        }

        let p0 = self.samples[before - 1].numeric_value()?;
        let p1 = self.samples[before].numeric_value()?;
        let p2 = self.samples[after].numeric_value()?;
        let p3 = self.samples[after + 1].numeric_value()?;

        let t1 = self.samples[before].timestamp;
        let t2 = self.samples[after].timestamp;
        let span = (t2 - t1) as f64;
        if span <= 0.0 {
            return Some(p1);
        }
        let u = (timestamp - t1) as f64 / span;
        let u2 = u * u;
        let u3 = u2 * u;

        Some(
            0.5 * (2.0 * p1
                + (p2 - p0) * u
                + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
                + (3.0 * p1 - p0 - 3.0 * p2 + p3) * u3),
        )
    }
}

/// Two-pointer merge of sorted sequences; `existing` wins ties
fn merge_sorted(existing: Vec<Sample>, incoming: Vec<Sample>) -> Vec<Sample> {
    let mut merged = Vec::with_capacity(existing.len() + incoming.len());
    let mut a = existing.into_iter().peekable();
    let mut b = incoming.into_iter().peekable();

    loop {
        let take_existing = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => x.timestamp <= y.timestamp,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_existing { a.next() } else { b.next() };
        merged.extend(next);
    }

    merged
}

struct BucketAccumulator {
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
    count: usize,
}

impl BucketAccumulator {
    fn new(value: f64) -> Self {
        Self {
            sum: value,
            min: value,
            max: value,
            last: value,
            count: 1,
        }
    }

    fn add(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.last = value;
        self.count += 1;
    }

    fn finish(self, timestamp: i64, mode: AggregationMode) -> AggregatedBucket {
        let value = match mode {
            AggregationMode::Mean => self.sum / self.count as f64,
            AggregationMode::Min => self.min,
            AggregationMode::Max => self.max,
            AggregationMode::Last => self.last,
        };
        AggregatedBucket {
            timestamp,
            value,
            count: self.count,
        }
    }
}
