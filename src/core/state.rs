//! Core State trait and the manager's three-valued state.
//!
//! States are plain values; inspecting them has no side effects.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Trait for values that can be tracked in a [`StateHistory`](super::StateHistory).
///
/// # Required Traits
///
/// - `Clone`: states are copied into history records
/// - `PartialEq`: transitions are only recorded when the state changes
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: states are persisted in checkpoints
///
/// # Example
///
/// ```rust
/// use geofence_manager::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum SyncState {
///     Waiting,
///     Syncing,
///     Broken,
/// }
///
/// impl State for SyncState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Waiting => "Waiting",
///             Self::Syncing => "Syncing",
///             Self::Broken => "Broken",
///         }
///     }
///
///     fn is_busy(&self) -> bool {
///         matches!(self, Self::Syncing)
///     }
///
///     fn is_error(&self) -> bool {
///         matches!(self, Self::Broken)
///     }
/// }
/// ```
pub trait State: Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync {
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if work is in flight while in this state.
    ///
    /// Default implementation returns `false`.
    fn is_busy(&self) -> bool {
        false
    }

    /// Check if this is an error state.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}

/// Coarse state of a [`GeofenceManager`](crate::GeofenceManager).
///
/// There is no terminal state: every state can be left by issuing a new
/// request.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum ManagerState {
    /// No monitoring changes in flight.
    #[default]
    Idle,
    /// Registrations were issued and at least one acknowledgement is pending.
    Processing,
    /// The most recent operation reported an error.
    Failed,
}

impl State for ManagerState {
    fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Processing => "Processing",
            Self::Failed => "Failed",
        }
    }

    fn is_busy(&self) -> bool {
        matches!(self, Self::Processing)
    }

    fn is_error(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
