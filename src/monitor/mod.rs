//! The platform region-monitoring service.
//!
//! The manager never decides containment itself. It registers regions with a
//! [`RegionMonitor`] and reacts to the [`RegionEvent`]s the monitor reports
//! back. Platform adapters implement the trait; [`SimulatedMonitor`] is an
//! in-process implementation driven by a simulated device position.

mod simulated;

pub use simulated::{MonitorCall, SimulatedMonitor};

use crate::geofence::Geofence;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location authorization granted to the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationStatus {
    /// Region monitoring keeps running in the background, so it needs
    /// always-on authorization.
    pub fn permits_monitoring(&self) -> bool {
        matches!(self, Self::AuthorizedAlways)
    }

    /// Whether the user has already answered the authorization prompt.
    pub fn is_determined(&self) -> bool {
        !matches!(self, Self::NotDetermined)
    }
}

/// Position of the device relative to a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionState {
    Unknown,
    Inside,
    Outside,
}

/// Errors reported by the platform for a single region.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MonitorError {
    #[error("region limit of {limit} reached")]
    LimitExceeded { limit: usize },

    #[error("radius {radius}m exceeds platform maximum of {maximum}m")]
    RadiusTooLarge { radius: f64, maximum: f64 },

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("platform error: {0}")]
    Platform(String),
}

/// Asynchronous notifications delivered by a region-monitoring service.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionEvent {
    /// The platform accepted a registration.
    DidStartMonitoring(Geofence),
    DidEnter(Geofence),
    DidExit(Geofence),
    /// Answer to [`RegionMonitor::request_state`].
    DidDetermineState(Geofence, RegionState),
    /// The platform could not monitor the region.
    MonitoringDidFail(Geofence, MonitorError),
    AuthorizationChanged(AuthorizationStatus),
}

/// A platform region-monitoring service.
///
/// Calls that change registrations return immediately. Outcomes arrive later
/// as [`RegionEvent`]s, either pushed into
/// [`GeofenceManager::handle_event`](crate::GeofenceManager::handle_event) by
/// the platform adapter or queued and handed out by [`poll_events`](Self::poll_events).
pub trait RegionMonitor {
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the user for authorization. The answer arrives as
    /// [`RegionEvent::AuthorizationChanged`].
    fn request_authorization(&mut self) {}

    fn location_services_enabled(&self) -> bool {
        true
    }

    /// Whether the device supports monitoring circular regions at all.
    fn is_monitoring_available(&self) -> bool {
        true
    }

    /// Largest radius, in metres, the platform accepts.
    fn maximum_region_radius(&self) -> Option<f64> {
        None
    }

    /// Register a region. Acknowledged with [`RegionEvent::DidStartMonitoring`]
    /// or [`RegionEvent::MonitoringDidFail`].
    fn start_monitoring(&mut self, geofence: &Geofence);

    /// Deregister a region. Platforms do not acknowledge removals.
    fn stop_monitoring(&mut self, geofence: &Geofence);

    /// Ask for the device's current position relative to a monitored region.
    fn request_state(&mut self, _geofence: &Geofence) {}

    /// Drain callbacks queued since the last call.
    fn poll_events(&mut self) -> Vec<RegionEvent> {
        Vec::new()
    }
}

impl<M: RegionMonitor + ?Sized> RegionMonitor for Box<M> {
    fn authorization_status(&self) -> AuthorizationStatus {
        (**self).authorization_status()
    }

    fn request_authorization(&mut self) {
        (**self).request_authorization()
    }

    fn location_services_enabled(&self) -> bool {
        (**self).location_services_enabled()
    }

    fn is_monitoring_available(&self) -> bool {
        (**self).is_monitoring_available()
    }

    fn maximum_region_radius(&self) -> Option<f64> {
        (**self).maximum_region_radius()
    }

    fn start_monitoring(&mut self, geofence: &Geofence) {
        (**self).start_monitoring(geofence)
    }

    fn stop_monitoring(&mut self, geofence: &Geofence) {
        (**self).stop_monitoring(geofence)
    }

    fn request_state(&mut self, geofence: &Geofence) {
        (**self).request_state(geofence)
    }

    fn poll_events(&mut self) -> Vec<RegionEvent> {
        (**self).poll_events()
    }
}
