//! Batch orchestration: merge, fetch, partition, annotate.

use std::future::Future;

use crate::location::parse_location;
use crate::partition::interval_average;
use crate::types::{Coordinates, ExecuteError, FetchError, Sample, UsageInterval};
use crate::window::{SpanningWindow, compute_spanning_window};

/// A provider of carbon intensity samples for a spanning window.
///
/// Implementations must return samples in non-decreasing `point_time`
/// order; the engine does not re-sort. An empty result is valid at this
/// layer and only becomes an error once an interval ends up with no
/// overlapping data.
///
/// Implementations must be safe for concurrent batches; the engine itself
/// holds no shared mutable state.
pub trait SampleSource {
    /// Fetches all samples covering `window` at `location`.
    fn fetch_samples(
        &self,
        location: Coordinates,
        window: &SpanningWindow,
    ) -> impl Future<Output = Result<Vec<Sample>, FetchError>> + Send;
}

/// Annotates every interval in the batch with its average grid carbon
/// intensity, preserving input order.
///
/// Steps are strictly sequenced: validate every present `geolocation`
/// (failing fast with the offending index), compute the spanning window,
/// parse the representative location, fetch once, then partition per
/// interval. Any failure aborts the whole batch; no partial results are
/// produced and nothing is retried.
///
/// All intervals are assumed to share the fetch location of the first one.
/// A batch with heterogeneous locations silently uses only the first.
pub async fn execute<S: SampleSource>(
    source: &S,
    mut intervals: Vec<UsageInterval>,
) -> Result<Vec<UsageInterval>, ExecuteError> {
    for (index, interval) in intervals.iter().enumerate() {
        if interval.geolocation.is_some() {
            parse_location(interval, index)?;
        }
    }

    let window = compute_spanning_window(&intervals)?;
    tracing::debug!(start = %window.start, end = %window.end, "computed spanning window");

    let location = parse_location(&intervals[0], 0)?;
    let samples = source.fetch_samples(location, &window).await?;
    tracing::debug!(count = samples.len(), "fetched samples");

    for (index, interval) in intervals.iter_mut().enumerate() {
        let average = interval_average(&samples, interval.timestamp, interval.end(), index)?;
        interval.carbon_intensity = Some(average);
    }

    Ok(intervals)
}
