//! Manager error types.

use crate::geofence::Geofence;
use crate::monitor::{AuthorizationStatus, MonitorError};
use crate::validation::GeofenceViolation;
use thiserror::Error;

/// Errors surfaced by a [`GeofenceManager`](super::GeofenceManager).
///
/// Each one moves the manager to `Failed` and is passed to the delegate's
/// `on_failed`. Nothing is retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ManagerError {
    #[error("Location authorization is insufficient for region monitoring ({status:?})")]
    AuthorizationDenied { status: AuthorizationStatus },

    #[error("Location services are disabled")]
    LocationServicesDisabled,

    #[error("Region monitoring is not available on this device")]
    RegionMonitoringUnavailable,

    #[error("Monitoring failed for geofence '{}': {source}", .geofence.identifier())]
    MonitoringFailed {
        geofence: Geofence,
        #[source]
        source: MonitorError,
    },

    #[error("{} invalid geofence(s): {}", .violations.len(), join(.violations))]
    InvalidGeofences { violations: Vec<GeofenceViolation> },
}

impl ManagerError {
    /// The region the error concerns, if it is about a single region.
    pub fn geofence(&self) -> Option<&Geofence> {
        match self {
            Self::MonitoringFailed { geofence, .. } => Some(geofence),
            _ => None,
        }
    }
}

fn join(violations: &[GeofenceViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
