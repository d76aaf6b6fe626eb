//! In-process region-monitoring service.

use super::{AuthorizationStatus, MonitorError, RegionEvent, RegionMonitor, RegionState};
use crate::geofence::{Coordinate, Geofence};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Default number of regions one application may register.
pub const DEFAULT_REGION_LIMIT: usize = 20;

/// Default maximum radius in metres.
pub const DEFAULT_MAXIMUM_RADIUS: f64 = 400_000.0;

/// A call made into the monitor, recorded for inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorCall {
    Start(Geofence),
    Stop(Geofence),
    RequestState(Geofence),
    RequestAuthorization,
}

/// Region-monitoring service that runs entirely in memory.
///
/// Registrations are acknowledged by queueing events, which are handed out
/// by [`poll_events`](RegionMonitor::poll_events). Entry and exit are derived
/// from the position set with [`move_to`](Self::move_to).
///
/// # Example
///
/// ```rust
/// use geofence_manager::monitor::{RegionEvent, RegionMonitor, SimulatedMonitor};
/// use geofence_manager::{Coordinate, Geofence};
///
/// let mut monitor = SimulatedMonitor::new();
/// let fence = Geofence::new("home", Coordinate::new(1.0, 1.0), 100.0);
///
/// monitor.start_monitoring(&fence);
/// monitor.move_to(Coordinate::new(1.0, 1.0));
///
/// assert_eq!(
///     monitor.poll_events(),
///     vec![
///         RegionEvent::DidStartMonitoring(fence.clone()),
///         RegionEvent::DidEnter(fence),
///     ]
/// );
/// ```
#[derive(Debug)]
pub struct SimulatedMonitor {
    authorization: AuthorizationStatus,
    authorization_answer: AuthorizationStatus,
    services_enabled: bool,
    monitoring_available: bool,
    region_limit: usize,
    maximum_radius: f64,
    regions: BTreeMap<String, Geofence>,
    inside: BTreeSet<String>,
    forced_failures: HashMap<String, MonitorError>,
    location: Option<Coordinate>,
    events: VecDeque<RegionEvent>,
    calls: Vec<MonitorCall>,
}

impl Default for SimulatedMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedMonitor {
    /// An authorized monitor with the default region limit and radius.
    pub fn new() -> Self {
        Self {
            authorization: AuthorizationStatus::AuthorizedAlways,
            authorization_answer: AuthorizationStatus::AuthorizedAlways,
            services_enabled: true,
            monitoring_available: true,
            region_limit: DEFAULT_REGION_LIMIT,
            maximum_radius: DEFAULT_MAXIMUM_RADIUS,
            regions: BTreeMap::new(),
            inside: BTreeSet::new(),
            forced_failures: HashMap::new(),
            location: None,
            events: VecDeque::new(),
            calls: Vec::new(),
        }
    }

    pub fn with_authorization(mut self, status: AuthorizationStatus) -> Self {
        self.authorization = status;
        self
    }

    /// Status the simulated user picks when authorization is requested.
    pub fn with_authorization_answer(mut self, status: AuthorizationStatus) -> Self {
        self.authorization_answer = status;
        self
    }

    pub fn with_region_limit(mut self, limit: usize) -> Self {
        self.region_limit = limit;
        self
    }

    pub fn with_maximum_radius(mut self, radius: f64) -> Self {
        self.maximum_radius = radius;
        self
    }

    pub fn set_location_services_enabled(&mut self, enabled: bool) {
        self.services_enabled = enabled;
    }

    pub fn set_monitoring_available(&mut self, available: bool) {
        self.monitoring_available = available;
    }

    /// Change the authorization and report it like a platform would.
    pub fn set_authorization(&mut self, status: AuthorizationStatus) {
        self.authorization = status;
        self.events.push_back(RegionEvent::AuthorizationChanged(status));
    }

    /// Make the next registrations of `identifier` fail with `error`.
    pub fn fail_region(&mut self, identifier: impl Into<String>, error: MonitorError) {
        self.forced_failures.insert(identifier.into(), error);
    }

    pub fn clear_failure(&mut self, identifier: &str) {
        self.forced_failures.remove(identifier);
    }

    /// Move the simulated device, queueing entry and exit events for every
    /// registered region whose containment changed.
    pub fn move_to(&mut self, location: Coordinate) {
        self.location = Some(location);
        for (identifier, geofence) in &self.regions {
            let inside_now = geofence.contains(&location);
            let was_inside = self.inside.contains(identifier);
            match (was_inside, inside_now) {
                (false, true) => {
                    self.inside.insert(identifier.clone());
                    self.events.push_back(RegionEvent::DidEnter(geofence.clone()));
                }
                (true, false) => {
                    self.inside.remove(identifier);
                    self.events.push_back(RegionEvent::DidExit(geofence.clone()));
                }
                _ => {}
            }
        }
    }

    pub fn location(&self) -> Option<Coordinate> {
        self.location
    }

    /// Regions the simulated platform is currently monitoring.
    pub fn regions(&self) -> impl Iterator<Item = &Geofence> {
        self.regions.values()
    }

    pub fn is_registered(&self, identifier: &str) -> bool {
        self.regions.contains_key(identifier)
    }

    /// Calls recorded since the last call to this method.
    pub fn take_calls(&mut self) -> Vec<MonitorCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn registration_error(&self, geofence: &Geofence) -> Option<MonitorError> {
        if let Some(error) = self.forced_failures.get(geofence.identifier()) {
            return Some(error.clone());
        }
        if !self.authorization.permits_monitoring() {
            return Some(MonitorError::Platform(format!(
                "not authorized ({:?})",
                self.authorization
            )));
        }
        if geofence.radius() > self.maximum_radius {
            return Some(MonitorError::RadiusTooLarge {
                radius: geofence.radius(),
                maximum: self.maximum_radius,
            });
        }
        let replacing = self.regions.contains_key(geofence.identifier());
        if !replacing && self.regions.len() >= self.region_limit {
            return Some(MonitorError::LimitExceeded {
                limit: self.region_limit,
            });
        }
        None
    }

    fn state_of(&self, geofence: &Geofence) -> RegionState {
        match self.location {
            Some(location) if geofence.contains(&location) => RegionState::Inside,
            Some(_) => RegionState::Outside,
            None => RegionState::Unknown,
        }
    }
}

impl RegionMonitor for SimulatedMonitor {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.authorization
    }

    fn request_authorization(&mut self) {
        self.calls.push(MonitorCall::RequestAuthorization);
        if !self.authorization.is_determined() {
            let answer = self.authorization_answer;
            self.set_authorization(answer);
        }
    }

    fn location_services_enabled(&self) -> bool {
        self.services_enabled
    }

    fn is_monitoring_available(&self) -> bool {
        self.monitoring_available
    }

    fn maximum_region_radius(&self) -> Option<f64> {
        Some(self.maximum_radius)
    }

    fn start_monitoring(&mut self, geofence: &Geofence) {
        self.calls.push(MonitorCall::Start(geofence.clone()));

        if let Some(error) = self.registration_error(geofence) {
            self.events.push_back(RegionEvent::MonitoringDidFail(geofence.clone(), error));
            return;
        }

        let identifier = geofence.identifier().to_string();
        self.inside.remove(&identifier);
        if let Some(location) = self.location {
            if geofence.contains(&location) {
                self.inside.insert(identifier.clone());
            }
        }
        self.regions.insert(identifier, geofence.clone());
        self.events.push_back(RegionEvent::DidStartMonitoring(geofence.clone()));
    }

    fn stop_monitoring(&mut self, geofence: &Geofence) {
        self.calls.push(MonitorCall::Stop(geofence.clone()));
        self.regions.remove(geofence.identifier());
        self.inside.remove(geofence.identifier());
    }

    fn request_state(&mut self, geofence: &Geofence) {
        self.calls.push(MonitorCall::RequestState(geofence.clone()));
        let state = self.state_of(geofence);
        self.events
            .push_back(RegionEvent::DidDetermineState(geofence.clone(), state));
    }

    fn poll_events(&mut self) -> Vec<RegionEvent> {
        self.events.drain(..).collect()
    }
}
