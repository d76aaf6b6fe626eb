//! State transition history tracking.
//!
//! History values are immutable: recording a transition returns a new
//! history and leaves the original untouched.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use geofence_manager::core::{ManagerState, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: ManagerState::Idle,
///     to: ManagerState::Processing,
///     timestamp: Utc::now(),
///     request: 1,
/// };
/// assert_eq!(transition.request, 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// Sequence number of the request that was current when the transition happened
    pub request: u64,
}

/// Ordered history of state transitions.
///
/// # Example
///
/// ```rust
/// use geofence_manager::core::{ManagerState, StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: ManagerState::Idle,
///         to: ManagerState::Processing,
///         timestamp: Utc::now(),
///         request: 1,
///     })
///     .record(StateTransition {
///         from: ManagerState::Processing,
///         to: ManagerState::Idle,
///         timestamp: Utc::now(),
///         request: 1,
///     });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // Idle -> Processing -> Idle
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is not modified.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Record a transition, keeping at most `capacity` of the newest entries.
    ///
    /// ```rust
    /// use geofence_manager::core::{ManagerState, StateHistory, StateTransition};
    /// use chrono::Utc;
    ///
    /// let mut history = StateHistory::new();
    /// for request in 1..=5 {
    ///     history = history.record_bounded(
    ///         StateTransition {
    ///             from: ManagerState::Idle,
    ///             to: ManagerState::Processing,
    ///             timestamp: Utc::now(),
    ///             request,
    ///         },
    ///         3,
    ///     );
    /// }
    /// assert_eq!(history.transitions().len(), 3);
    /// assert_eq!(history.transitions()[0].request, 3);
    /// ```
    pub fn record_bounded(&self, transition: StateTransition<S>, capacity: usize) -> Self {
        let mut recorded = self.record(transition);
        let excess = recorded.transitions.len().saturating_sub(capacity);
        if excess > 0 {
            recorded.transitions.drain(..excess);
        }
        recorded
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the first retained transition followed by
    /// the `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Calculate total duration from first to last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// The most recent transition, if any.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.last()
    }

    /// Get all transitions.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }
}
