//! Geolocation parsing.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Coordinates, UsageInterval, ValidationError};

/// Pre-compiled pattern for `"<latitude>,<longitude>"` in decimal degrees.
/// Both halves require a decimal fraction; only the longitude may carry a
/// minus sign.
static GEOLOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}\.\d+,-?\d{1,3}\.\d+$").unwrap());

/// Extracts the coordinate pair from an interval's `geolocation` field.
///
/// `index` is the interval's position in the batch, carried into errors so a
/// failure identifies the offending input.
pub fn parse_location(
    interval: &UsageInterval,
    index: usize,
) -> Result<Coordinates, ValidationError> {
    let Some(geolocation) = interval.geolocation.as_deref() else {
        return Err(ValidationError::MissingLocation { index });
    };
    if !GEOLOCATION_RE.is_match(geolocation) {
        return Err(ValidationError::MalformedLocation { index });
    }

    let (latitude, longitude) = geolocation
        .split_once(',')
        .ok_or(ValidationError::MalformedLocation { index })?;
    let latitude: f64 = latitude
        .parse()
        .map_err(|_| ValidationError::LocationNotANumber { index })?;
    let longitude: f64 = longitude
        .parse()
        .map_err(|_| ValidationError::LocationNotANumber { index })?;
    if latitude.is_nan() || longitude.is_nan() {
        return Err(ValidationError::LocationNotANumber { index });
    }

    Ok(Coordinates {
        latitude,
        longitude,
    })
}
