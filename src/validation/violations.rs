//! Reasons a desired region set is rejected.

use thiserror::Error;

/// A single problem found in a desired region set.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeofenceViolation {
    #[error("Geofence identifier is empty")]
    EmptyIdentifier,

    #[error("Geofence '{identifier}' has latitude {latitude} outside [-90, 90]")]
    LatitudeOutOfRange { identifier: String, latitude: f64 },

    #[error("Geofence '{identifier}' has longitude {longitude} outside [-180, 180]")]
    LongitudeOutOfRange { identifier: String, longitude: f64 },

    #[error("Geofence '{identifier}' has invalid radius {radius}")]
    InvalidRadius { identifier: String, radius: f64 },

    #[error("Geofence '{identifier}' radius {radius}m exceeds maximum {maximum}m")]
    RadiusTooLarge {
        identifier: String,
        radius: f64,
        maximum: f64,
    },

    #[error("Geofence identifier '{identifier}' appears more than once")]
    DuplicateIdentifier { identifier: String },

    #[error("{count} geofences requested, at most {max} can be monitored")]
    TooManyRegions { max: usize, count: usize },

    #[error("Custom check failed: {message}")]
    CustomCheckFailed { message: String },
}
