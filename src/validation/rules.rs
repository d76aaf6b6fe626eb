//! Rules a desired region set must satisfy before it reaches the platform.

use crate::geofence::Geofence;
use crate::validation::violations::GeofenceViolation;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for per-geofence check functions
pub type RegionCheck =
    Box<dyn Fn(&Geofence) -> Validation<(), NonEmptyVec<GeofenceViolation>> + Send + Sync>;

/// Rules applied to every desired region set.
/// Uses Validation to accumulate ALL violations.
pub struct RegionRules {
    pub(crate) max_regions: Option<usize>,
    pub(crate) max_radius: Option<f64>,
    pub(crate) required_checks: Vec<RegionCheck>,
}

impl Default for RegionRules {
    fn default() -> Self {
        Self {
            max_regions: None,
            max_radius: None,
            required_checks: Vec::new(),
        }
    }
}

impl std::fmt::Debug for RegionRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionRules")
            .field("max_regions", &self.max_regions)
            .field("max_radius", &self.max_radius)
            .field("required_checks", &self.required_checks.len())
            .finish()
    }
}

impl RegionRules {
    /// Check a desired set, accumulating every violation.
    ///
    /// `platform_max_radius` is the monitor's own limit; the stricter of it
    /// and the configured maximum applies.
    pub fn check(
        &self,
        geofences: &[Geofence],
        platform_max_radius: Option<f64>,
    ) -> Validation<(), NonEmptyVec<GeofenceViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<GeofenceViolation>>> = Vec::new();

        if let Some(max) = self.max_regions {
            if geofences.len() > max {
                checks.push(Validation::fail(GeofenceViolation::TooManyRegions {
                    max,
                    count: geofences.len(),
                }));
            }
        }

        let max_radius = match (self.max_radius, platform_max_radius) {
            (Some(configured), Some(platform)) => Some(configured.min(platform)),
            (configured, platform) => configured.or(platform),
        };

        let mut seen = HashSet::new();
        for geofence in geofences {
            checks.extend(check_geofence(geofence, max_radius));

            if !geofence.identifier().is_empty() && !seen.insert(geofence.identifier()) {
                checks.push(Validation::fail(GeofenceViolation::DuplicateIdentifier {
                    identifier: geofence.identifier().to_string(),
                }));
            }

            for check_fn in &self.required_checks {
                checks.push(check_fn(geofence));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Convenience wrapper returning the violations as a plain list.
    pub fn violations(
        &self,
        geofences: &[Geofence],
        platform_max_radius: Option<f64>,
    ) -> Vec<GeofenceViolation> {
        match self.check(geofences, platform_max_radius) {
            Validation::Success(()) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        }
    }

    pub fn max_regions(&self) -> Option<usize> {
        self.max_regions
    }

    pub fn max_radius(&self) -> Option<f64> {
        self.max_radius
    }
}

fn check_geofence(
    geofence: &Geofence,
    max_radius: Option<f64>,
) -> Vec<Validation<(), NonEmptyVec<GeofenceViolation>>> {
    let mut checks = Vec::new();
    let identifier = geofence.identifier();
    let center = geofence.center();
    let radius = geofence.radius();

    if identifier.is_empty() {
        checks.push(Validation::fail(GeofenceViolation::EmptyIdentifier));
    }

    if !(-90.0..=90.0).contains(&center.latitude) {
        checks.push(Validation::fail(GeofenceViolation::LatitudeOutOfRange {
            identifier: identifier.to_string(),
            latitude: center.latitude,
        }));
    }

    if !(-180.0..=180.0).contains(&center.longitude) {
        checks.push(Validation::fail(GeofenceViolation::LongitudeOutOfRange {
            identifier: identifier.to_string(),
            longitude: center.longitude,
        }));
    }

    if !radius.is_finite() || radius <= 0.0 {
        checks.push(Validation::fail(GeofenceViolation::InvalidRadius {
            identifier: identifier.to_string(),
            radius,
        }));
    } else if let Some(maximum) = max_radius.filter(|maximum| radius > *maximum) {
        checks.push(Validation::fail(GeofenceViolation::RadiusTooLarge {
            identifier: identifier.to_string(),
            radius,
            maximum,
        }));
    }

    checks
}
