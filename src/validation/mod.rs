//! Validation of desired region sets.
//!
//! Every region handed to the manager is checked before any platform call is
//! made. Checks use Stillwater's `Validation` type so that ALL problems in a
//! set are reported together instead of stopping at the first one.
//!
//! # Example
//!
//! ```rust
//! use geofence_manager::validation::{GeofenceViolation, RegionRulesBuilder};
//! use geofence_manager::{Coordinate, Geofence};
//!
//! let rules = RegionRulesBuilder::new().max_regions(20).max_radius(1_000.0).build();
//!
//! let fences = [
//!     Geofence::new("home", Coordinate::new(1.0, 1.0), 100.0),
//!     Geofence::new("stadium", Coordinate::new(1.0, 1.0), 5_000.0),
//! ];
//!
//! let violations = rules.violations(&fences, None);
//! assert_eq!(violations.len(), 1);
//! assert!(matches!(violations[0], GeofenceViolation::RadiusTooLarge { .. }));
//! ```

pub mod builder;
pub mod rules;
pub mod violations;

pub use builder::RegionRulesBuilder;
pub use rules::{RegionCheck, RegionRules};
pub use violations::GeofenceViolation;
