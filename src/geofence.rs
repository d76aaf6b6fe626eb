//! Geofence value types.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in metres.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        Haversine.distance(self.to_point(), other.to_point())
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// A circular region monitored for entry and exit.
///
/// Geofences are immutable once created. Two geofences with the same
/// identifier but different geometry are different regions: replacing one
/// with the other stops the old registration and starts the new one.
///
/// # Example
///
/// ```rust
/// use geofence_manager::{Coordinate, Geofence};
///
/// let home = Geofence::new("home", Coordinate::new(51.5007, -0.1246), 150.0);
///
/// assert_eq!(home.identifier(), "home");
/// assert!(home.contains(&Coordinate::new(51.5010, -0.1246)));
/// assert!(!home.contains(&Coordinate::new(51.5100, -0.1246)));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    identifier: String,
    center: Coordinate,
    radius: f64,
}

impl Geofence {
    /// Create a geofence. Values are checked when the geofence is handed to
    /// a manager, not here.
    pub fn new(identifier: impl Into<String>, center: Coordinate, radius: f64) -> Self {
        Self {
            identifier: identifier.into(),
            center,
            radius,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    /// Radius in metres.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether `point` lies inside the region, boundary included.
    pub fn contains(&self, point: &Coordinate) -> bool {
        self.center.distance_to(point) <= self.radius
    }
}

impl fmt::Display for Geofence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.6}, {:.6}) r={}m",
            self.identifier, self.center.latitude, self.center.longitude, self.radius
        )
    }
}
