//! Geofence Manager: keeps a platform region monitor in step with the
//! regions an application cares about.
//!
//! Platform region-monitoring services are asynchronous and stateful: a
//! registration is only confirmed by a later callback, authorization can be
//! revoked at any time, and the number of regions is capped. The manager
//! hides that behind a small request API and a delegate.
//!
//! # Core Concepts
//!
//! - **Monitor**: A platform service behind the [`RegionMonitor`] trait
//! - **Data source**: Supplies the full set of regions on reload
//! - **Delegate**: Receives acknowledgements, region crossings and failures
//! - **State**: [`ManagerState`] is `Idle`, `Processing` or `Failed`
//!
//! # Example
//!
//! ```rust
//! use geofence_manager::monitor::SimulatedMonitor;
//! use geofence_manager::{
//!     Coordinate, Geofence, GeofenceDataSource, GeofenceDelegate, GeofenceManager, ManagerState,
//! };
//! use std::sync::{Arc, Mutex};
//!
//! struct Places;
//!
//! impl GeofenceDataSource for Places {
//!     fn geofences(&self) -> Vec<Geofence> {
//!         vec![
//!             Geofence::new("home", Coordinate::new(1.0, 1.0), 100.0),
//!             Geofence::new("work", Coordinate::new(2.0, 2.0), 50.0),
//!         ]
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Log(Mutex<Vec<String>>);
//!
//! impl GeofenceDelegate for Log {
//!     fn on_finished_processing(&self, geofence: &Geofence) {
//!         self.0.lock().unwrap().push(geofence.identifier().to_string());
//!     }
//! }
//!
//! let places = Arc::new(Places);
//! let log = Arc::new(Log::default());
//!
//! let mut manager = GeofenceManager::new(SimulatedMonitor::new());
//! manager.set_data_source(&places);
//! manager.set_delegate(&log);
//!
//! manager.reload_geofences().unwrap();
//! manager.process_events();
//!
//! assert_eq!(manager.state(), ManagerState::Idle);
//! assert_eq!(*log.0.lock().unwrap(), vec!["home", "work"]);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod delegate;
pub mod geofence;
pub mod manager;
pub mod monitor;
pub mod reconcile;
pub mod shared;
pub mod validation;

// Re-export commonly used types
pub use builder::{BuildError, GeofenceManagerBuilder};
pub use checkpoint::{CheckpointError, ManagerCheckpoint};
pub use config::{ConfigError, ManagerConfig};
pub use core::{ManagerState, State, StateHistory, StateTransition};
pub use delegate::{GeofenceDataSource, GeofenceDelegate};
pub use geofence::{Coordinate, Geofence};
pub use manager::{GeofenceManager, ManagerError};
pub use monitor::{
    AuthorizationStatus, MonitorError, RegionEvent, RegionMonitor, RegionState, SimulatedMonitor,
};
pub use validation::{GeofenceViolation, RegionRules, RegionRulesBuilder};
