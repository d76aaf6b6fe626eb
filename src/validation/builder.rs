//! Builder API for creating region rules.

use crate::config::ManagerConfig;
use crate::geofence::Geofence;
use crate::validation::rules::{RegionCheck, RegionRules};
use crate::validation::violations::GeofenceViolation;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for creating region rules
pub struct RegionRulesBuilder {
    max_regions: Option<usize>,
    max_radius: Option<f64>,
    required_checks: Vec<RegionCheck>,
}

impl RegionRulesBuilder {
    pub fn new() -> Self {
        Self {
            max_regions: None,
            max_radius: None,
            required_checks: Vec::new(),
        }
    }

    /// Start from the limits in a manager configuration.
    pub fn from_config(config: &ManagerConfig) -> Self {
        let builder = Self::new().max_regions(config.max_regions);
        match config.max_radius {
            Some(radius) => builder.max_radius(radius),
            None => builder,
        }
    }

    /// Set the largest number of regions a desired set may contain
    pub fn max_regions(mut self, n: usize) -> Self {
        self.max_regions = Some(n);
        self
    }

    /// Set the largest accepted radius in metres
    pub fn max_radius(mut self, radius: f64) -> Self {
        self.max_radius = Some(radius);
        self
    }

    /// Add a custom validation check
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&Geofence) -> Validation<(), NonEmptyVec<GeofenceViolation>> + Send + Sync + 'static,
    {
        self.required_checks.push(Box::new(check));
        self
    }

    /// Add a simple predicate check with error message
    pub fn require_pred<F>(mut self, predicate: F, error_msg: String) -> Self
    where
        F: Fn(&Geofence) -> bool + Send + Sync + 'static,
    {
        let check = move |geofence: &Geofence| {
            if predicate(geofence) {
                Validation::success(())
            } else {
                Validation::fail(GeofenceViolation::CustomCheckFailed {
                    message: error_msg.clone(),
                })
            }
        };
        self.required_checks.push(Box::new(check));
        self
    }

    /// Build the rules
    pub fn build(self) -> RegionRules {
        RegionRules {
            max_regions: self.max_regions,
            max_radius: self.max_radius,
            required_checks: self.required_checks,
        }
    }
}

impl Default for RegionRulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
