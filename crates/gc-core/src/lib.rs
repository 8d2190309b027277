//! Core aggregation engine for grid carbon intensity estimation.
//!
//! This crate contains the batch pipeline:
//! - window: merging input intervals into one minimal spanning fetch window
//! - location: extracting fetch coordinates from interval geolocations
//! - partition: re-partitioning fetched samples onto intervals and averaging
//! - aggregate: the orchestrator sequencing the steps behind a
//!   [`SampleSource`] seam
//!
//! The engine is stateless across invocations and performs exactly one
//! upstream fetch per batch.

mod aggregate;
mod location;
mod partition;
mod types;
mod window;

pub use aggregate::{SampleSource, execute};
pub use location::parse_location;
pub use partition::{LBS_PER_KG, interval_average, select_converted};
pub use types::{Coordinates, ExecuteError, FetchError, Sample, UsageInterval, ValidationError};
pub use window::{MAX_FETCH_SPAN_SECONDS, SpanningWindow, compute_spanning_window};
