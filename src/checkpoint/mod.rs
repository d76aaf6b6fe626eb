//! Snapshots of a manager that survive process restarts.
//!
//! Platforms keep monitoring registered regions after the application exits.
//! A checkpoint records what the manager had confirmed so a new process can
//! pick up where the old one stopped instead of re-registering everything.

use crate::core::{ManagerState, StateHistory};
use crate::geofence::Geofence;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a [`GeofenceManager`](crate::GeofenceManager).
/// Does NOT include the monitor, delegate or data source.
///
/// # Example
///
/// ```rust
/// use geofence_manager::checkpoint::ManagerCheckpoint;
/// use geofence_manager::monitor::SimulatedMonitor;
/// use geofence_manager::{Coordinate, Geofence, GeofenceManager};
///
/// let mut manager = GeofenceManager::new(SimulatedMonitor::new());
/// manager
///     .add_geofences(&[Geofence::new("home", Coordinate::new(1.0, 1.0), 100.0)])
///     .unwrap();
/// manager.process_events();
///
/// let json = manager.checkpoint().to_json().unwrap();
/// let restored = ManagerCheckpoint::from_json(&json).unwrap();
/// assert_eq!(restored.monitored.len(), 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ManagerCheckpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Manager state at the time of the snapshot
    pub state: ManagerState,

    /// Regions the platform had acknowledged
    pub monitored: Vec<Geofence>,

    /// Regions registered but not yet acknowledged
    pub pending: Vec<Geofence>,

    /// State transition history
    pub history: StateHistory<ManagerState>,
}

impl ManagerCheckpoint {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self).map_err(|e| CheckpointError::Encode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self =
            serde_json::from_str(json).map_err(|e| CheckpointError::Decode(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Compact binary encoding.
    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::Encode(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self =
            bincode::deserialize(bytes).map_err(|e| CheckpointError::Decode(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Check version and internal consistency.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        let mut seen = HashSet::new();
        for geofence in self.monitored.iter().chain(&self.pending) {
            if !seen.insert(geofence.identifier()) {
                return Err(CheckpointError::Inconsistent(format!(
                    "geofence '{}' recorded more than once",
                    geofence.identifier()
                )));
            }
        }

        Ok(())
    }
}
