//! Capabilities the application lends to the manager.
//!
//! The manager holds both collaborators through [`std::sync::Weak`], so it
//! never keeps them alive. Once the application drops them, the matching
//! notifications and reloads silently stop.

use crate::core::ManagerState;
use crate::geofence::Geofence;
use crate::manager::ManagerError;

/// Receiver of manager notifications.
///
/// Every method defaults to a no-op; implement only what you need.
/// Notifications are delivered synchronously from inside manager calls, so
/// implementations must not call back into the manager.
///
/// # Example
///
/// ```rust
/// use geofence_manager::{Geofence, GeofenceDelegate};
/// use std::sync::Mutex;
///
/// #[derive(Default)]
/// struct Arrivals(Mutex<Vec<String>>);
///
/// impl GeofenceDelegate for Arrivals {
///     fn on_inside_region(&self, geofence: &Geofence) {
///         self.0.lock().unwrap().push(geofence.identifier().to_string());
///     }
/// }
/// ```
pub trait GeofenceDelegate: Send + Sync {
    /// The platform accepted the region and is now monitoring it.
    fn on_finished_processing(&self, _geofence: &Geofence) {}

    /// The device entered, or was found to be inside, the region.
    fn on_inside_region(&self, _geofence: &Geofence) {}

    /// The device exited, or was found to be outside, the region.
    fn on_outside_region(&self, _geofence: &Geofence) {}

    fn on_state_changed(&self, _state: ManagerState) {}

    /// A request or registration failed. A refused authorization is reported
    /// once; the registrations it abandons are not reported again.
    fn on_failed(&self, _error: &ManagerError) {}
}

/// Supplier of the regions that should be monitored.
pub trait GeofenceDataSource: Send + Sync {
    /// The complete desired set, queried on every reload.
    fn geofences(&self) -> Vec<Geofence>;
}
