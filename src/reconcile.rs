//! Diffing the active region set against a desired set.
//!
//! Planning is a pure function; the manager applies the plan.

use crate::geofence::Geofence;
use std::collections::{BTreeMap, HashMap};

/// Registrations needed to turn the active set into the desired set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconcilePlan {
    /// Regions to deregister, ordered by identifier.
    pub to_stop: Vec<Geofence>,
    /// Regions to register, in desired order.
    pub to_start: Vec<Geofence>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_stop.is_empty() && self.to_start.is_empty()
    }
}

/// Plan the stops and starts that make `active` equal `desired`.
///
/// A region whose identifier is kept but whose geometry changed appears in
/// both lists. Regions present unchanged on both sides appear in neither.
/// Identifiers in `desired` are expected to be unique.
///
/// # Example
///
/// ```rust
/// use geofence_manager::reconcile::plan;
/// use geofence_manager::{Coordinate, Geofence};
/// use std::collections::BTreeMap;
///
/// let a = Geofence::new("a", Coordinate::new(1.0, 1.0), 100.0);
/// let b = Geofence::new("b", Coordinate::new(2.0, 2.0), 50.0);
/// let c = Geofence::new("c", Coordinate::new(3.0, 3.0), 25.0);
///
/// let active: BTreeMap<String, Geofence> = [a.clone(), b.clone()]
///     .into_iter()
///     .map(|g| (g.identifier().to_string(), g))
///     .collect();
///
/// let plan = plan(&active, &[b, c.clone()]);
/// assert_eq!(plan.to_stop, vec![a]);
/// assert_eq!(plan.to_start, vec![c]);
/// ```
pub fn plan(active: &BTreeMap<String, Geofence>, desired: &[Geofence]) -> ReconcilePlan {
    let wanted: HashMap<&str, &Geofence> = desired
        .iter()
        .map(|geofence| (geofence.identifier(), geofence))
        .collect();

    let to_stop = active
        .iter()
        .filter(|(identifier, current)| wanted.get(identifier.as_str()) != Some(current))
        .map(|(_, current)| current.clone())
        .collect();

    let to_start = desired
        .iter()
        .filter(|geofence| active.get(geofence.identifier()) != Some(*geofence))
        .cloned()
        .collect();

    ReconcilePlan { to_stop, to_start }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geofence::Coordinate;

    fn fence(id: &str, radius: f64) -> Geofence {
        Geofence::new(id, Coordinate::new(1.0, 1.0), radius)
    }

    fn active(fences: &[Geofence]) -> BTreeMap<String, Geofence> {
        fences
            .iter()
            .map(|g| (g.identifier().to_string(), g.clone()))
            .collect()
    }

    #[test]
    fn empty_to_empty_is_empty() {
        let plan = plan(&BTreeMap::new(), &[]);
        assert!(plan.is_empty());
    }

    #[test]
    fn unchanged_regions_are_left_alone() {
        let fences = [fence("a", 10.0), fence("b", 20.0)];
        let plan = plan(&active(&fences), &fences);
        assert!(plan.is_empty());
    }

    #[test]
    fn empty_desired_stops_everything() {
        let fences = [fence("b", 20.0), fence("a", 10.0)];
        let plan = plan(&active(&fences), &[]);

        assert_eq!(plan.to_stop, vec![fence("a", 10.0), fence("b", 20.0)]);
        assert!(plan.to_start.is_empty());
    }

    #[test]
    fn changed_geometry_is_stopped_and_restarted() {
        let plan = plan(&active(&[fence("a", 10.0)]), &[fence("a", 15.0)]);

        assert_eq!(plan.to_stop, vec![fence("a", 10.0)]);
        assert_eq!(plan.to_start, vec![fence("a", 15.0)]);
    }

    #[test]
    fn starts_keep_desired_order() {
        let plan = plan(&BTreeMap::new(), &[fence("z", 1.0), fence("m", 1.0), fence("a", 1.0)]);

        let order: Vec<&str> = plan.to_start.iter().map(Geofence::identifier).collect();
        assert_eq!(order, vec!["z", "m", "a"]);
    }
}
