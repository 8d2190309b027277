//! Spanning-window computation for batched fetches.
//!
//! A batch of intervals is covered by one upstream query. The window is the
//! earliest start and latest end across the batch, bounded by the provider's
//! maximum queryable range.

use chrono::{DateTime, Utc};

use crate::types::{UsageInterval, ValidationError};

/// Maximum queryable range in seconds. The WattTime API caps historical
/// queries at 32 days.
pub const MAX_FETCH_SPAN_SECONDS: i64 = 32 * 24 * 60 * 60;

/// The minimal time range covering every interval in a batch.
///
/// Derived per batch and discarded after partitioning; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanningWindow {
    /// Minimum `timestamp` across the batch.
    pub start: DateTime<Utc>,

    /// Maximum `timestamp + duration` across the batch.
    pub end: DateTime<Utc>,
}

impl SpanningWindow {
    /// Window length in whole seconds.
    #[must_use]
    pub fn span_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

/// Computes the single fetch window covering every input interval.
///
/// A single O(n) fold tracks the running minimum start and maximum end, so
/// input order is irrelevant and no sort is performed. Fails before any
/// network call if the batch is empty or the window exceeds
/// [`MAX_FETCH_SPAN_SECONDS`].
pub fn compute_spanning_window(
    intervals: &[UsageInterval],
) -> Result<SpanningWindow, ValidationError> {
    let mut bounds: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
    for interval in intervals {
        let (start, end) = (interval.timestamp, interval.end());
        bounds = Some(match bounds {
            None => (start, end),
            Some((min_start, max_end)) => (min_start.min(start), max_end.max(end)),
        });
    }
    let Some((start, end)) = bounds else {
        return Err(ValidationError::EmptyBatch);
    };

    let window = SpanningWindow { start, end };
    let span_seconds = window.span_seconds();
    if span_seconds > MAX_FETCH_SPAN_SECONDS {
        return Err(ValidationError::SpanTooLong {
            span_seconds,
            max_seconds: MAX_FETCH_SPAN_SECONDS,
        });
    }

    Ok(window)
}
