use serde::{Deserialize, Serialize};

/// Value carried by a telemetry sample
///
/// Numeric values are the common case; structured payloads are retained as-is
/// and are treated as "no value" by numeric queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Numeric(f64),
    Structured(serde_json::Value),
}

impl SampleValue {
    /// Numeric projection of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SampleValue::Numeric(v) => Some(*v),
            SampleValue::Structured(value) => value.as_f64(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }
}

impl From<f64> for SampleValue {
    fn from(value: f64) -> Self {
        SampleValue::Numeric(value)
    }
}

impl From<serde_json::Value> for SampleValue {
    fn from(value: serde_json::Value) -> Self {
        match value.as_f64() {
            Some(v) => SampleValue::Numeric(v),
            None => SampleValue::Structured(value),
        }
    }
}

/// A single timestamped telemetry sample (epoch milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub timestamp: i64,
    pub value: SampleValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
}

impl Sample {
    pub fn new(timestamp: i64, value: impl Into<SampleValue>) -> Self {
        Self {
            timestamp,
            value: value.into(),
            stream_id: None,
        }
    }

    pub fn with_stream_id(mut self, stream_id: impl Into<String>) -> Self {
        self.stream_id = Some(stream_id.into());
        self
    }

    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// Project onto the (x, y) plane used by the decimation algorithms
    pub fn to_point(&self) -> Option<Point> {
        self.numeric_value()
            .map(|y| Point::new(self.timestamp as f64, y))
    }
}

/// Coordinate pair consumed by decimation and resampling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_value_deserializes_numbers_as_numeric() {
        let sample: Sample =
            serde_json::from_str(r#"{"timestamp": 10, "value": 2.5, "streamId": "cpu"}"#).unwrap();
        assert_eq!(sample.value, SampleValue::Numeric(2.5));
        assert_eq!(sample.stream_id.as_deref(), Some("cpu"));
    }

    #[test]
    fn test_structured_value_has_no_numeric_projection() {
        let sample: Sample =
            serde_json::from_str(r#"{"timestamp": 10, "value": {"lat": 1.0, "lon": 2.0}}"#)
                .unwrap();
        assert!(sample.numeric_value().is_none());
        assert!(sample.to_point().is_none());
    }

    #[test]
    fn test_sample_serializes_camel_case() {
        let sample = Sample::new(5, 1.0).with_stream_id("s1");
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["streamId"], "s1");
        assert_eq!(json["timestamp"], 5);
    }
}
