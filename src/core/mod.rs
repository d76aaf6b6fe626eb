//! Core state types.
//!
//! This module contains the value types describing the manager's state:
//! - The `State` trait and the three-valued `ManagerState`
//! - Immutable history of state transitions
//!
//! Nothing in this module performs I/O or talks to a platform service.

mod history;
mod state;

pub use history::{StateHistory, StateTransition};
pub use state::{ManagerState, State};
