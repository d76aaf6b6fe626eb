//! Process-wide manager instance.
//!
//! Applications that cannot pass a manager around can use a single shared
//! one. It is created on first access and lives until the process exits.
//! Prefer constructing and passing a [`GeofenceManager`] explicitly where
//! possible.

use crate::manager::GeofenceManager;
use crate::monitor::RegionMonitor;
use std::sync::{Mutex, OnceLock};

/// Platform monitor type used by the shared instance.
pub type SharedMonitor = Box<dyn RegionMonitor + Send>;

/// The shared manager, serialised behind a mutex because platform callbacks
/// may arrive on a different thread than application requests.
pub type SharedGeofenceManager = Mutex<GeofenceManager<SharedMonitor>>;

static SHARED: OnceLock<SharedGeofenceManager> = OnceLock::new();

/// Get the shared manager, creating it with `init` on first access.
///
/// `init` runs at most once per process; later calls ignore it.
///
/// # Example
///
/// ```rust
/// use geofence_manager::monitor::SimulatedMonitor;
/// use geofence_manager::shared::shared_manager;
/// use geofence_manager::ManagerState;
///
/// let shared = shared_manager(|| Box::new(SimulatedMonitor::new()));
/// let manager = shared.lock().unwrap();
/// assert_eq!(manager.state(), ManagerState::Idle);
/// ```
pub fn shared_manager<F>(init: F) -> &'static SharedGeofenceManager
where
    F: FnOnce() -> SharedMonitor,
{
    SHARED.get_or_init(|| {
        tracing::debug!("Creating shared geofence manager");
        Mutex::new(GeofenceManager::new(init()))
    })
}

/// Get the shared manager if it has been created.
pub fn try_shared_manager() -> Option<&'static SharedGeofenceManager> {
    SHARED.get()
}
