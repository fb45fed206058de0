// Configuration and statistics types for the streaming buffer

use crate::error::{BufferError, BufferResult};
use serde::{Deserialize, Serialize};

/// How `get_interpolated_value` estimates between samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    /// Value of the nearest preceding sample
    Step,
    #[default]
    Linear,
    /// Catmull-Rom through the bracketing pair and one neighbour on each side
    Smooth,
}

/// Reduction applied to each bucket by `get_aggregated_buckets`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    #[default]
    Mean,
    Min,
    Max,
    Last,
}

impl std::str::FromStr for InterpolationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "step" => Ok(Self::Step),
            "linear" => Ok(Self::Linear),
            "smooth" => Ok(Self::Smooth),
            other => Err(format!(
                "Unknown interpolation mode '{}'. Expected step, linear or smooth",
                other
            )),
        }
    }
}

impl std::str::FromStr for AggregationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "last" => Ok(Self::Last),
            other => Err(format!(
                "Unknown aggregation mode '{}'. Expected mean, min, max or last",
                other
            )),
        }
    }
}

/// Configuration for a streaming buffer, fixed for the buffer's lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferConfig {
    /// Maximum number of retained samples
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Retention horizon in milliseconds (0 = unbounded by time)
    #[serde(default)]
    pub window_size: u64,

    /// Batch ingestion compresses once the buffer holds this many samples
    #[serde(default)]
    pub compression_threshold: Option<usize>,

    #[serde(default)]
    pub interpolation: InterpolationMode,

    #[serde(default)]
    pub aggregation: AggregationMode,
}

fn default_capacity() -> usize {
    10_000
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            window_size: 0,
            compression_threshold: None,
            interpolation: InterpolationMode::default(),
            aggregation: AggregationMode::default(),
        }
    }
}

impl BufferConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> BufferResult<()> {
        if self.capacity == 0 {
            return Err(BufferError::InvalidConfig(
                "capacity must be a positive integer".to_string(),
            ));
        }
        if self.compression_threshold == Some(0) {
            return Err(BufferError::InvalidConfig(
                "compressionThreshold must be a positive integer".to_string(),
            ));
        }
        if self.window_size > i64::MAX as u64 {
            return Err(BufferError::InvalidConfig(format!(
                "windowSize {} ms is out of range",
                self.window_size
            )));
        }
        Ok(())
    }
}

/// Derived statistics, recomputed after every mutation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferStatistics {
    pub count: usize,
    pub oldest_timestamp: Option<i64>,
    pub newest_timestamp: Option<i64>,
    /// Mean spacing between consecutive samples in milliseconds
    pub average_interval: f64,
    /// count / capacity
    pub utilization: f64,
    /// original / compressed size of the last compression, if one ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,
}

/// One non-empty bucket produced by `get_aggregated_buckets`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedBucket {
    /// Bucket start: `start + index * bucket_size`
    pub timestamp: i64,
    pub value: f64,
    /// Number of numeric samples reduced into this bucket
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_json() {
        let config: BufferConfig = serde_json::from_str(r#"{"capacity": 5}"#).unwrap();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.window_size, 0);
        assert_eq!(config.compression_threshold, None);
        assert_eq!(config.interpolation, InterpolationMode::Linear);
        assert_eq!(config.aggregation, AggregationMode::Mean);
    }

    #[test]
    fn test_config_validation() {
        assert!(BufferConfig::with_capacity(0).validate().is_err());
        let config = BufferConfig {
            compression_threshold: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(BufferConfig::default().validate().is_ok());
    }

    #[test]
    fn test_modes_parse() {
        assert_eq!("STEP".parse::<InterpolationMode>(), Ok(InterpolationMode::Step));
        assert_eq!("last".parse::<AggregationMode>(), Ok(AggregationMode::Last));
        assert!("median".parse::<AggregationMode>().is_err());
    }
}
