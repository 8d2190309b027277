//! Core type definitions and the shared error taxonomy.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for batch inputs and partitioned results.
///
/// Every variant that concerns a single interval carries its position in the
/// batch so a failure can be diagnosed without re-running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The input batch contained no intervals.
    #[error("input batch cannot be empty")]
    EmptyBatch,

    /// The merged fetch window exceeds the provider's maximum range.
    #[error("fetch window of {span_seconds} seconds exceeds the {max_seconds} second maximum")]
    SpanTooLong { span_seconds: i64, max_seconds: i64 },

    /// The interval used for fetching has no `geolocation` field.
    #[error("input[{index}] has no 'geolocation' field")]
    MissingLocation { index: usize },

    /// The `geolocation` string does not match the expected pattern.
    #[error("'geolocation' of input[{index}] is not a comma separated latitude,longitude pair")]
    MalformedLocation { index: usize },

    /// A coordinate half failed to parse as a number.
    #[error("'latitude' or 'longitude' of input[{index}] is not a number")]
    LocationNotANumber { index: usize },

    /// The fetch succeeded but produced no data overlapping this interval.
    #[error("no grid intensity samples overlap input[{index}]")]
    NoSamplesForInterval { index: usize },
}

/// Failures reported by a [`SampleSource`](crate::SampleSource)
/// implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The upstream rejected the session credentials. Never retried here;
    /// credential refresh is the source's responsibility.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// Any other non-success response or transport failure.
    #[error("upstream request failed: {message}")]
    Upstream { message: String },
}

/// Batch execution errors.
///
/// A single failure anywhere in a batch yields one error and zero partial
/// output records.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// One unit of work to annotate with a grid carbon intensity estimate.
///
/// Intervals in a batch may overlap, be disjoint, or arrive unordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageInterval {
    /// Interval start.
    pub timestamp: DateTime<Utc>,

    /// Interval length in seconds. `timestamp + duration` is the exclusive
    /// end.
    pub duration: u32,

    /// `"<latitude>,<longitude>"` in decimal degrees. Required on the
    /// interval used for fetching; validated wherever present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<String>,

    /// Average grid carbon intensity in g CO2e/kWh, attached by
    /// [`execute`](crate::execute).
    #[serde(
        rename = "grid/carbon-intensity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub carbon_intensity: Option<f64>,
}

impl UsageInterval {
    /// Exclusive end of the interval.
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.timestamp + Duration::seconds(i64::from(self.duration))
    }
}

/// One upstream-reported carbon intensity reading.
///
/// `value` is in the source's native unit, lbs CO2e/MWh. Sequences of
/// samples are non-decreasing in time; duplicate timestamps are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Instant the reading was taken.
    pub point_time: DateTime<Utc>,

    /// Raw reading in lbs CO2e/MWh.
    pub value: f64,
}

/// A coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn interval_end_is_exclusive_bound() {
        let interval = UsageInterval {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).single().unwrap(),
            duration: 3600,
            geolocation: None,
            carbon_intensity: None,
        };
        assert_eq!(
            interval.end(),
            Utc.with_ymd_and_hms(2024, 3, 4, 11, 0, 0).single().unwrap()
        );
    }

    #[test]
    fn interval_serde_uses_wire_names() {
        let json = r#"{"timestamp":"2024-03-04T10:00:00Z","duration":3600,"geolocation":"45.0,-122.0"}"#;
        let interval: UsageInterval = serde_json::from_str(json).unwrap();
        assert_eq!(interval.geolocation.as_deref(), Some("45.0,-122.0"));
        assert_eq!(interval.carbon_intensity, None);

        let annotated = UsageInterval {
            carbon_intensity: Some(1102.3),
            ..interval
        };
        let rendered = serde_json::to_string(&annotated).unwrap();
        assert!(rendered.contains("\"grid/carbon-intensity\":1102.3"));
    }

    #[test]
    fn interval_serde_omits_absent_fields() {
        let interval = UsageInterval {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).single().unwrap(),
            duration: 0,
            geolocation: None,
            carbon_intensity: None,
        };
        let rendered = serde_json::to_string(&interval).unwrap();
        assert!(!rendered.contains("geolocation"));
        assert!(!rendered.contains("grid/carbon-intensity"));
    }

    #[test]
    fn interval_serde_rejects_negative_duration() {
        let json = r#"{"timestamp":"2024-03-04T10:00:00Z","duration":-5}"#;
        let result: Result<UsageInterval, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn validation_error_messages_carry_index() {
        let err = ValidationError::NoSamplesForInterval { index: 3 };
        assert!(err.to_string().contains("input[3]"));
    }
}
