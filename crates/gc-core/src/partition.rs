//! Re-partitioning fetched samples onto input intervals.

use chrono::{DateTime, Utc};

use crate::types::{Sample, ValidationError};

/// Pounds per kilogram. The source reports lbs CO2e/MWh; dividing by this
/// yields kg/MWh, and kg/MWh equals g/kWh because the 1000-factor mass and
/// energy conversions cancel, so this one constant performs the whole chain.
/// Do not fold it into another constant without re-deriving the units.
pub const LBS_PER_KG: f64 = 0.453_592_37;

/// Selects the samples falling in `[start, end)` and converts each value
/// from lbs/MWh to g/kWh.
///
/// The end bound is exclusive so a reading taken at the shared boundary of
/// two adjacent intervals is attributed to exactly one of them.
#[must_use]
pub fn select_converted(samples: &[Sample], start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<f64> {
    samples
        .iter()
        .filter(|sample| sample.point_time >= start && sample.point_time < end)
        .map(|sample| sample.value / LBS_PER_KG)
        .collect()
}

/// Averages the samples overlapping `[start, end)`, in g CO2e/kWh.
///
/// An empty selection means the upstream fetch succeeded but produced no
/// data for this interval; `index` identifies it in the batch.
#[expect(
    clippy::cast_precision_loss,
    reason = "sample counts are far below f64 precision limits"
)]
pub fn interval_average(
    samples: &[Sample],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    index: usize,
) -> Result<f64, ValidationError> {
    let converted = select_converted(samples, start, end);
    if converted.is_empty() {
        return Err(ValidationError::NoSamplesForInterval { index });
    }
    Ok(converted.iter().sum::<f64>() / converted.len() as f64)
}
