//! Builder API for assembling a manager from its parts.
//!
//! Use [`GeofenceManagerBuilder`] when a manager needs more than a monitor:
//! a configuration, custom region rules, collaborators, or a checkpoint to
//! resume from.

pub mod error;
pub mod manager;

pub use error::BuildError;
pub use manager::GeofenceManagerBuilder;
