//! The geofence manager.
//!
//! The manager keeps an *active set*: regions registered with the platform
//! and not since stopped or rejected. Each request computes a desired set
//! and reconciles the active set onto it. Additions stay *pending* until the
//! platform acknowledges them; removals take effect immediately because
//! platforms do not acknowledge them.

mod error;

pub use error::ManagerError;

use crate::checkpoint::{ManagerCheckpoint, CHECKPOINT_VERSION};
use crate::config::{ConfigError, ManagerConfig};
use crate::core::{ManagerState, State, StateHistory, StateTransition};
use crate::delegate::{GeofenceDataSource, GeofenceDelegate};
use crate::geofence::Geofence;
use crate::monitor::{RegionEvent, RegionMonitor, RegionState};
use crate::reconcile;
use crate::validation::{RegionRules, RegionRulesBuilder};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Weak};

/// Tracks the regions an application wants monitored and relays platform
/// callbacks to a delegate.
///
/// # Example
///
/// ```rust
/// use geofence_manager::monitor::SimulatedMonitor;
/// use geofence_manager::{Coordinate, Geofence, GeofenceManager, ManagerState};
///
/// let mut manager = GeofenceManager::new(SimulatedMonitor::new());
///
/// manager
///     .add_geofences(&[Geofence::new("home", Coordinate::new(1.0, 1.0), 100.0)])
///     .unwrap();
/// assert_eq!(manager.state(), ManagerState::Processing);
///
/// manager.process_events();
/// assert_eq!(manager.state(), ManagerState::Idle);
/// assert!(manager.is_monitoring("home"));
/// ```
pub struct GeofenceManager<M: RegionMonitor> {
    monitor: M,
    config: ManagerConfig,
    rules: RegionRules,
    pub(crate) delegate: Option<Weak<dyn GeofenceDelegate>>,
    pub(crate) data_source: Option<Weak<dyn GeofenceDataSource>>,
    state: ManagerState,
    active: BTreeMap<String, Geofence>,
    pending: BTreeSet<String>,
    history: StateHistory<ManagerState>,
    request: u64,
}

impl<M: RegionMonitor> GeofenceManager<M> {
    /// Create a manager with the default configuration.
    pub fn new(monitor: M) -> Self {
        let config = ManagerConfig::default();
        let rules = RegionRulesBuilder::from_config(&config).build();
        Self::with_rules(monitor, config, rules)
    }

    /// Create a manager whose region rules are derived from `config`.
    ///
    /// Fails if `config` does not pass [`ManagerConfig::validate`].
    pub fn with_config(monitor: M, config: ManagerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rules = RegionRulesBuilder::from_config(&config).build();
        Ok(Self::with_rules(monitor, config, rules))
    }

    pub(crate) fn with_rules(monitor: M, config: ManagerConfig, rules: RegionRules) -> Self {
        Self {
            monitor,
            config,
            rules,
            delegate: None,
            data_source: None,
            state: ManagerState::Idle,
            active: BTreeMap::new(),
            pending: BTreeSet::new(),
            history: StateHistory::new(),
            request: 0,
        }
    }

    /// Seed the active set and history from a checkpoint.
    pub(crate) fn resume(&mut self, checkpoint: ManagerCheckpoint) {
        self.active = checkpoint
            .monitored
            .into_iter()
            .map(|geofence| (geofence.identifier().to_string(), geofence))
            .collect();
        self.pending.clear();
        self.history = checkpoint.history;
        self.request = self.history.last().map_or(0, |t| t.request);
        self.state = ManagerState::Idle;
        tracing::info!(
            checkpoint = %checkpoint.id,
            regions = self.active.len(),
            "Resumed geofence manager from checkpoint"
        );
    }

    /// Set the delegate without taking ownership of it.
    pub fn set_delegate<D: GeofenceDelegate + 'static>(&mut self, delegate: &Arc<D>) {
        let weak: Weak<D> = Arc::downgrade(delegate);
        self.delegate = Some(weak);
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// Set the data source without taking ownership of it.
    pub fn set_data_source<S: GeofenceDataSource + 'static>(&mut self, data_source: &Arc<S>) {
        let weak: Weak<S> = Arc::downgrade(data_source);
        self.data_source = Some(weak);
    }

    pub fn clear_data_source(&mut self) {
        self.data_source = None;
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn rules(&self) -> &RegionRules {
        &self.rules
    }

    pub fn history(&self) -> &StateHistory<ManagerState> {
        &self.history
    }

    pub fn monitor(&self) -> &M {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut M {
        &mut self.monitor
    }

    /// Regions the platform has confirmed it is monitoring.
    pub fn monitored(&self) -> Vec<&Geofence> {
        self.active
            .iter()
            .filter(|(identifier, _)| !self.pending.contains(*identifier))
            .map(|(_, geofence)| geofence)
            .collect()
    }

    /// Regions registered but not yet acknowledged.
    pub fn pending(&self) -> Vec<&Geofence> {
        self.pending
            .iter()
            .filter_map(|identifier| self.active.get(identifier))
            .collect()
    }

    /// Monitored and pending regions together, ordered by identifier.
    pub fn active(&self) -> Vec<&Geofence> {
        self.active.values().collect()
    }

    /// Whether the platform has confirmed monitoring of `identifier`.
    pub fn is_monitoring(&self, identifier: &str) -> bool {
        self.active.contains_key(identifier) && !self.pending.contains(identifier)
    }

    /// Replace the active set with the data source's regions.
    ///
    /// Does nothing when no data source is set or it has been dropped.
    pub fn reload_geofences(&mut self) -> Result<(), ManagerError> {
        let Some(data_source) = self.data_source.as_ref().and_then(Weak::upgrade) else {
            tracing::debug!("No data source available, skipping reload");
            return Ok(());
        };
        let desired = data_source.geofences();
        self.apply(desired)
    }

    /// Add regions, replacing active ones that share an identifier.
    pub fn add_geofences(&mut self, geofences: &[Geofence]) -> Result<(), ManagerError> {
        let added: BTreeSet<&str> = geofences.iter().map(Geofence::identifier).collect();
        let desired = self
            .active
            .values()
            .filter(|geofence| !added.contains(geofence.identifier()))
            .chain(geofences)
            .cloned()
            .collect();
        self.apply(desired)
    }

    /// Remove the regions with the same identifiers as `geofences`.
    pub fn remove_geofences(&mut self, geofences: &[Geofence]) -> Result<(), ManagerError> {
        let removed: BTreeSet<&str> = geofences.iter().map(Geofence::identifier).collect();
        let desired = self
            .active
            .values()
            .filter(|geofence| !removed.contains(geofence.identifier()))
            .cloned()
            .collect();
        self.apply(desired)
    }

    pub fn remove_all_geofences(&mut self) -> Result<(), ManagerError> {
        self.apply(Vec::new())
    }

    /// Ask the platform for the current state of every monitored region.
    ///
    /// The set of regions is unchanged. Answers arrive as
    /// [`RegionEvent::DidDetermineState`] and reach the delegate as
    /// `on_inside_region` or `on_outside_region`.
    pub fn refresh_geofences(&mut self) -> Result<(), ManagerError> {
        self.request += 1;

        if let Err(error) = self.preflight() {
            self.fail(error.clone());
            return Err(error);
        }

        let monitored: Vec<Geofence> = self.monitored().into_iter().cloned().collect();
        tracing::info!(
            request = self.request,
            regions = monitored.len(),
            "Refreshing geofence states"
        );
        for geofence in &monitored {
            self.monitor.request_state(geofence);
        }

        if self.pending.is_empty() {
            self.transition(ManagerState::Idle);
        } else {
            self.transition(ManagerState::Processing);
        }
        Ok(())
    }

    /// Handle one platform callback.
    pub fn handle_event(&mut self, event: RegionEvent) {
        match event {
            RegionEvent::DidStartMonitoring(geofence) => self.on_started(geofence),
            RegionEvent::MonitoringDidFail(geofence, source) => {
                if !self.is_awaited(&geofence) {
                    tracing::debug!(
                        identifier = %geofence.identifier(),
                        error = %source,
                        "Ignoring failure for a registration that is no longer pending"
                    );
                    return;
                }
                tracing::warn!(
                    identifier = %geofence.identifier(),
                    error = %source,
                    "Platform failed to monitor geofence"
                );
                self.pending.remove(geofence.identifier());
                self.active.remove(geofence.identifier());
                self.fail(ManagerError::MonitoringFailed { geofence, source });
            }
            RegionEvent::DidEnter(geofence) => {
                tracing::info!(identifier = %geofence.identifier(), "Entered geofence");
                self.notify(|d| d.on_inside_region(&geofence));
            }
            RegionEvent::DidExit(geofence) => {
                tracing::info!(identifier = %geofence.identifier(), "Exited geofence");
                self.notify(|d| d.on_outside_region(&geofence));
            }
            RegionEvent::DidDetermineState(geofence, region_state) => match region_state {
                RegionState::Inside => self.notify(|d| d.on_inside_region(&geofence)),
                RegionState::Outside => self.notify(|d| d.on_outside_region(&geofence)),
                RegionState::Unknown => {
                    tracing::debug!(identifier = %geofence.identifier(), "Region state unknown");
                }
            },
            RegionEvent::AuthorizationChanged(status) => {
                if status.is_determined() && !status.permits_monitoring() {
                    self.abandon_pending();
                    self.fail(ManagerError::AuthorizationDenied { status });
                } else {
                    tracing::debug!(status = ?status, "Authorization changed");
                }
            }
        }
    }

    /// Handle every callback the monitor has queued. Returns how many were handled.
    pub fn process_events(&mut self) -> usize {
        let events = self.monitor.poll_events();
        let count = events.len();
        for event in events {
            self.handle_event(event);
        }
        count
    }

    /// Snapshot the manager for persistence.
    pub fn checkpoint(&self) -> ManagerCheckpoint {
        ManagerCheckpoint {
            version: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            state: self.state,
            monitored: self.monitored().into_iter().cloned().collect(),
            pending: self.pending().into_iter().cloned().collect(),
            history: self.history.clone(),
        }
    }

    fn apply(&mut self, desired: Vec<Geofence>) -> Result<(), ManagerError> {
        self.request += 1;

        if let Err(error) = self.preflight() {
            self.fail(error.clone());
            return Err(error);
        }

        let violations = self
            .rules
            .violations(&desired, self.monitor.maximum_region_radius());
        if !violations.is_empty() {
            let error = ManagerError::InvalidGeofences { violations };
            self.fail(error.clone());
            return Err(error);
        }

        let plan = reconcile::plan(&self.active, &desired);
        tracing::info!(
            request = self.request,
            stop = plan.to_stop.len(),
            start = plan.to_start.len(),
            "Reconciling geofences"
        );

        for geofence in &plan.to_stop {
            tracing::debug!(identifier = %geofence.identifier(), "Stopping geofence");
            self.monitor.stop_monitoring(geofence);
            self.active.remove(geofence.identifier());
            self.pending.remove(geofence.identifier());
        }

        for geofence in plan.to_start {
            tracing::debug!(identifier = %geofence.identifier(), "Starting geofence");
            self.monitor.start_monitoring(&geofence);
            self.pending.insert(geofence.identifier().to_string());
            self.active.insert(geofence.identifier().to_string(), geofence);
        }

        if self.pending.is_empty() {
            self.transition(ManagerState::Idle);
        } else {
            self.transition(ManagerState::Processing);
        }
        Ok(())
    }

    fn preflight(&mut self) -> Result<(), ManagerError> {
        if !self.monitor.location_services_enabled() {
            return Err(ManagerError::LocationServicesDisabled);
        }

        let status = self.monitor.authorization_status();
        if !status.is_determined() {
            tracing::info!("Requesting location authorization");
            self.monitor.request_authorization();
        } else if !status.permits_monitoring() {
            return Err(ManagerError::AuthorizationDenied { status });
        }

        if !self.monitor.is_monitoring_available() {
            return Err(ManagerError::RegionMonitoringUnavailable);
        }

        Ok(())
    }

    /// Whether `geofence` is exactly the registration still waiting for an
    /// acknowledgement. Callbacks for replaced or removed registrations are stale.
    fn is_awaited(&self, geofence: &Geofence) -> bool {
        self.pending.contains(geofence.identifier())
            && self.active.get(geofence.identifier()) == Some(geofence)
    }

    /// Forget every unacknowledged registration. Their pending callbacks
    /// become stale and are ignored when they arrive.
    fn abandon_pending(&mut self) {
        for identifier in std::mem::take(&mut self.pending) {
            tracing::debug!(identifier = %identifier, "Abandoning pending geofence");
            self.active.remove(&identifier);
        }
    }

    fn on_started(&mut self, geofence: Geofence) {
        if !self.is_awaited(&geofence) {
            tracing::debug!(
                identifier = %geofence.identifier(),
                "Ignoring acknowledgement for a registration that is not pending"
            );
            return;
        }
        self.pending.remove(geofence.identifier());

        tracing::info!(identifier = %geofence.identifier(), "Monitoring geofence");
        self.notify(|d| d.on_finished_processing(&geofence));

        if self.config.request_initial_state {
            self.monitor.request_state(&geofence);
        }

        if self.pending.is_empty() && self.state.is_busy() {
            self.transition(ManagerState::Idle);
        }
    }

    fn fail(&mut self, error: ManagerError) {
        tracing::warn!(error = %error, "Geofence manager failed");
        self.transition(ManagerState::Failed);
        self.notify(|d| d.on_failed(&error));
    }

    fn transition(&mut self, to: ManagerState) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.history = self.history.record_bounded(
            StateTransition {
                from,
                to,
                timestamp: Utc::now(),
                request: self.request,
            },
            self.config.history_capacity,
        );
        self.state = to;
        tracing::debug!(from = from.name(), to = to.name(), "State changed");
        self.notify(|d| d.on_state_changed(to));
    }

    fn notify<F: FnOnce(&dyn GeofenceDelegate)>(&self, f: F) {
        if let Some(delegate) = self.delegate.as_ref().and_then(Weak::upgrade) {
            f(delegate.as_ref());
        }
    }
}

impl<M: RegionMonitor> std::fmt::Debug for GeofenceManager<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeofenceManager")
            .field("state", &self.state)
            .field("active", &self.active.keys().collect::<Vec<_>>())
            .field("pending", &self.pending)
            .field("request", &self.request)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geofence::Coordinate;
    use crate::monitor::{AuthorizationStatus, MonitorCall, MonitorError, SimulatedMonitor};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Note {
        Finished(String),
        Inside(String),
        Outside(String),
        State(ManagerState),
        Failed(ManagerError),
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Note>>);

    impl Recorder {
        fn take(&self) -> Vec<Note> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl GeofenceDelegate for Recorder {
        fn on_finished_processing(&self, geofence: &Geofence) {
            self.0
                .lock()
                .unwrap()
                .push(Note::Finished(geofence.identifier().to_string()));
        }

        fn on_inside_region(&self, geofence: &Geofence) {
            self.0
                .lock()
                .unwrap()
                .push(Note::Inside(geofence.identifier().to_string()));
        }

        fn on_outside_region(&self, geofence: &Geofence) {
            self.0
                .lock()
                .unwrap()
                .push(Note::Outside(geofence.identifier().to_string()));
        }

        fn on_state_changed(&self, state: ManagerState) {
            self.0.lock().unwrap().push(Note::State(state));
        }

        fn on_failed(&self, error: &ManagerError) {
            self.0.lock().unwrap().push(Note::Failed(error.clone()));
        }
    }

    struct Silent;

    impl GeofenceDelegate for Silent {}

    struct FixedSource(Mutex<Vec<Geofence>>);

    impl GeofenceDataSource for FixedSource {
        fn geofences(&self) -> Vec<Geofence> {
            self.0.lock().unwrap().clone()
        }
    }

    fn fence(id: &str, lat: f64, lon: f64, radius: f64) -> Geofence {
        Geofence::new(id, Coordinate::new(lat, lon), radius)
    }

    fn quiet_manager() -> GeofenceManager<SimulatedMonitor> {
        let config = ManagerConfig {
            request_initial_state: false,
            ..ManagerConfig::default()
        };
        GeofenceManager::with_config(SimulatedMonitor::new(), config).unwrap()
    }

    #[test]
    fn starts_idle_with_nothing_active() {
        let manager = GeofenceManager::new(SimulatedMonitor::new());
        assert_eq!(manager.state(), ManagerState::Idle);
        assert!(manager.active().is_empty());
        assert!(manager.history().transitions().is_empty());
    }

    #[test]
    fn add_goes_processing_then_idle() {
        let recorder = Arc::new(Recorder::default());
        let mut manager = quiet_manager();
        manager.set_delegate(&recorder);

        manager.add_geofences(&[fence("home", 1.0, 1.0, 100.0)]).unwrap();
        assert_eq!(manager.state(), ManagerState::Processing);
        assert_eq!(manager.pending().len(), 1);
        assert!(!manager.is_monitoring("home"));

        assert_eq!(manager.process_events(), 1);
        assert_eq!(manager.state(), ManagerState::Idle);
        assert!(manager.is_monitoring("home"));
        assert_eq!(
            recorder.take(),
            vec![
                Note::State(ManagerState::Processing),
                Note::Finished("home".to_string()),
                Note::State(ManagerState::Idle),
            ]
        );
    }

    #[test]
    fn request_without_changes_stays_idle() {
        let recorder = Arc::new(Recorder::default());
        let mut manager = quiet_manager();
        manager.set_delegate(&recorder);

        manager.remove_all_geofences().unwrap();

        assert_eq!(manager.state(), ManagerState::Idle);
        assert!(recorder.take().is_empty());
        assert!(manager.monitor_mut().take_calls().is_empty());
    }

    #[test]
    fn removal_is_synchronous() {
        let mut manager = quiet_manager();
        let home = fence("home", 1.0, 1.0, 100.0);
        manager.add_geofences(&[home.clone()]).unwrap();
        manager.process_events();
        manager.monitor_mut().take_calls();

        manager.remove_geofences(&[home.clone()]).unwrap();

        assert_eq!(manager.state(), ManagerState::Idle);
        assert!(manager.active().is_empty());
        assert_eq!(manager.monitor_mut().take_calls(), vec![MonitorCall::Stop(home)]);
    }

    #[test]
    fn adding_same_identifier_replaces_region() {
        let mut manager = quiet_manager();
        manager.add_geofences(&[fence("home", 1.0, 1.0, 100.0)]).unwrap();
        manager.process_events();
        manager.monitor_mut().take_calls();

        manager.add_geofences(&[fence("home", 1.0, 1.0, 300.0)]).unwrap();

        assert_eq!(
            manager.monitor_mut().take_calls(),
            vec![
                MonitorCall::Stop(fence("home", 1.0, 1.0, 100.0)),
                MonitorCall::Start(fence("home", 1.0, 1.0, 300.0)),
            ]
        );
        manager.process_events();
        assert_eq!(manager.monitored(), vec![&fence("home", 1.0, 1.0, 300.0)]);
    }

    #[test]
    fn platform_failure_moves_to_failed_and_keeps_others() {
        let recorder = Arc::new(Recorder::default());
        let mut manager = quiet_manager();
        manager.set_delegate(&recorder);
        manager
            .monitor_mut()
            .fail_region("cafe", MonitorError::Platform("rejected".to_string()));

        manager
            .add_geofences(&[fence("cafe", 3.0, 3.0, 25.0), fence("work", 2.0, 2.0, 50.0)])
            .unwrap();
        manager.process_events();

        assert_eq!(manager.state(), ManagerState::Failed);
        assert!(manager.is_monitoring("work"));
        assert!(!manager.is_monitoring("cafe"));
        assert!(manager.pending().is_empty());

        let notes = recorder.take();
        assert!(notes.contains(&Note::Failed(ManagerError::MonitoringFailed {
            geofence: fence("cafe", 3.0, 3.0, 25.0),
            source: MonitorError::Platform("rejected".to_string()),
        })));
        assert!(notes.contains(&Note::Finished("work".to_string())));
        assert_eq!(notes.last(), Some(&Note::Finished("work".to_string())));
    }

    #[test]
    fn failed_state_is_left_by_a_new_request() {
        let mut manager = quiet_manager();
        manager
            .monitor_mut()
            .fail_region("cafe", MonitorError::Platform("rejected".to_string()));
        manager.add_geofences(&[fence("cafe", 3.0, 3.0, 25.0)]).unwrap();
        manager.process_events();
        assert_eq!(manager.state(), ManagerState::Failed);

        manager.remove_all_geofences().unwrap();
        assert_eq!(manager.state(), ManagerState::Idle);

        manager.monitor_mut().clear_failure("cafe");
        manager.add_geofences(&[fence("cafe", 3.0, 3.0, 25.0)]).unwrap();
        assert_eq!(manager.state(), ManagerState::Processing);
    }

    #[test]
    fn preflight_failures_make_no_platform_calls() {
        let cases: Vec<(SimulatedMonitor, ManagerError)> = vec![
            (
                {
                    let mut monitor = SimulatedMonitor::new();
                    monitor.set_location_services_enabled(false);
                    monitor
                },
                ManagerError::LocationServicesDisabled,
            ),
            (
                SimulatedMonitor::new().with_authorization(AuthorizationStatus::Denied),
                ManagerError::AuthorizationDenied {
                    status: AuthorizationStatus::Denied,
                },
            ),
            (
                SimulatedMonitor::new()
                    .with_authorization(AuthorizationStatus::AuthorizedWhenInUse),
                ManagerError::AuthorizationDenied {
                    status: AuthorizationStatus::AuthorizedWhenInUse,
                },
            ),
            (
                {
                    let mut monitor = SimulatedMonitor::new();
                    monitor.set_monitoring_available(false);
                    monitor
                },
                ManagerError::RegionMonitoringUnavailable,
            ),
        ];

        for (monitor, expected) in cases {
            let recorder = Arc::new(Recorder::default());
            let mut manager = GeofenceManager::new(monitor);
            manager.set_delegate(&recorder);

            let result = manager.add_geofences(&[fence("home", 1.0, 1.0, 100.0)]);

            assert_eq!(result, Err(expected.clone()));
            assert_eq!(manager.state(), ManagerState::Failed);
            assert!(manager.active().is_empty());
            assert!(manager.monitor_mut().take_calls().is_empty());
            assert_eq!(
                recorder.take(),
                vec![Note::State(ManagerState::Failed), Note::Failed(expected)]
            );
        }
    }

    #[test]
    fn undetermined_authorization_is_requested() {
        let monitor =
            SimulatedMonitor::new().with_authorization(AuthorizationStatus::NotDetermined);
        let mut manager = GeofenceManager::new(monitor);

        manager.add_geofences(&[fence("home", 1.0, 1.0, 100.0)]).unwrap();

        let calls = manager.monitor_mut().take_calls();
        assert_eq!(calls[0], MonitorCall::RequestAuthorization);
        manager.process_events();
        assert_eq!(manager.state(), ManagerState::Idle);
    }

    #[test]
    fn refused_authorization_fails_the_manager() {
        let monitor = SimulatedMonitor::new()
            .with_authorization(AuthorizationStatus::NotDetermined)
            .with_authorization_answer(AuthorizationStatus::Denied);
        let recorder = Arc::new(Recorder::default());
        let mut manager = quiet_manager_with(monitor);
        manager.set_delegate(&recorder);

        manager
            .add_geofences(&[fence("home", 1.0, 1.0, 100.0), fence("work", 2.0, 2.0, 50.0)])
            .unwrap();
        manager.process_events();

        assert_eq!(manager.state(), ManagerState::Failed);
        assert!(manager.active().is_empty());
        assert!(manager.pending().is_empty());
        assert_eq!(
            recorder.take(),
            vec![
                Note::State(ManagerState::Processing),
                Note::State(ManagerState::Failed),
                Note::Failed(ManagerError::AuthorizationDenied {
                    status: AuthorizationStatus::Denied
                }),
            ]
        );
    }

    fn quiet_manager_with(monitor: SimulatedMonitor) -> GeofenceManager<SimulatedMonitor> {
        let config = ManagerConfig {
            request_initial_state: false,
            ..ManagerConfig::default()
        };
        GeofenceManager::with_config(monitor, config).unwrap()
    }

    #[test]
    fn invalid_regions_are_rejected_before_the_platform() {
        let recorder = Arc::new(Recorder::default());
        let mut manager = quiet_manager();
        manager.set_delegate(&recorder);

        let result = manager.add_geofences(&[fence("", 1.0, 1.0, 100.0)]);

        assert!(matches!(result, Err(ManagerError::InvalidGeofences { .. })));
        assert_eq!(manager.state(), ManagerState::Failed);
        assert!(manager.monitor_mut().take_calls().is_empty());
    }

    #[test]
    fn region_limit_comes_from_config() {
        let config = ManagerConfig {
            max_regions: 1,
            ..ManagerConfig::default()
        };
        let mut manager = GeofenceManager::with_config(SimulatedMonitor::new(), config).unwrap();

        let result =
            manager.add_geofences(&[fence("a", 1.0, 1.0, 10.0), fence("b", 2.0, 2.0, 10.0)]);

        assert_eq!(
            result,
            Err(ManagerError::InvalidGeofences {
                violations: vec![crate::validation::GeofenceViolation::TooManyRegions {
                    max: 1,
                    count: 2
                }]
            })
        );
    }

    #[test]
    fn enter_exit_and_initial_state_are_forwarded() {
        let recorder = Arc::new(Recorder::default());
        let mut manager = GeofenceManager::new(SimulatedMonitor::new());
        manager.set_delegate(&recorder);
        manager.monitor_mut().move_to(Coordinate::new(1.0, 1.0));

        manager
            .add_geofences(&[fence("home", 1.0, 1.0, 100.0), fence("work", 2.0, 2.0, 50.0)])
            .unwrap();
        manager.process_events();
        manager.process_events();
        recorder.take();

        manager.monitor_mut().move_to(Coordinate::new(2.0, 2.0));
        manager.process_events();

        assert_eq!(
            recorder.take(),
            vec![
                Note::Outside("home".to_string()),
                Note::Inside("work".to_string()),
            ]
        );
    }

    #[test]
    fn initial_state_reports_inside_and_outside() {
        let recorder = Arc::new(Recorder::default());
        let mut manager = GeofenceManager::new(SimulatedMonitor::new());
        manager.set_delegate(&recorder);
        manager.monitor_mut().move_to(Coordinate::new(1.0, 1.0));

        manager
            .add_geofences(&[fence("home", 1.0, 1.0, 100.0), fence("work", 2.0, 2.0, 50.0)])
            .unwrap();
        manager.process_events();
        recorder.take();
        manager.process_events();

        assert_eq!(
            recorder.take(),
            vec![
                Note::Inside("home".to_string()),
                Note::Outside("work".to_string()),
            ]
        );
    }

    #[test]
    fn stale_acknowledgement_is_ignored() {
        let mut manager = quiet_manager();
        let home = fence("home", 1.0, 1.0, 100.0);
        manager.add_geofences(&[home.clone()]).unwrap();
        manager.remove_all_geofences().unwrap();

        manager.process_events();

        assert_eq!(manager.state(), ManagerState::Idle);
        assert!(manager.active().is_empty());
    }

    #[test]
    fn late_callbacks_from_a_replaced_registration_are_ignored() {
        let mut manager = quiet_manager();
        manager.add_geofences(&[fence("home", 1.0, 1.0, 100.0)]).unwrap();
        manager
            .monitor_mut()
            .fail_region("home", MonitorError::Platform("rejected".to_string()));
        manager.add_geofences(&[fence("home", 1.0, 1.0, 300.0)]).unwrap();

        let mut events = manager.monitor_mut().poll_events().into_iter();

        manager.handle_event(events.next().unwrap());
        assert_eq!(manager.state(), ManagerState::Processing);
        assert!(!manager.is_monitoring("home"));
        assert_eq!(manager.pending(), vec![&fence("home", 1.0, 1.0, 300.0)]);

        manager.handle_event(events.next().unwrap());
        assert_eq!(manager.state(), ManagerState::Failed);
        assert!(!manager.is_monitoring("home"));
        assert!(manager.active().is_empty());
        assert!(!manager.monitor().is_registered("home"));
    }

    #[test]
    fn late_failure_of_a_replaced_registration_is_ignored() {
        let recorder = Arc::new(Recorder::default());
        let mut manager = quiet_manager();
        manager.set_delegate(&recorder);
        manager
            .monitor_mut()
            .fail_region("home", MonitorError::Platform("rejected".to_string()));
        manager.add_geofences(&[fence("home", 1.0, 1.0, 100.0)]).unwrap();
        manager.monitor_mut().clear_failure("home");
        manager.add_geofences(&[fence("home", 1.0, 1.0, 300.0)]).unwrap();

        manager.process_events();

        assert_eq!(manager.state(), ManagerState::Idle);
        assert_eq!(manager.monitored(), vec![&fence("home", 1.0, 1.0, 300.0)]);
        assert!(!recorder
            .take()
            .iter()
            .any(|note| matches!(note, Note::Failed(_))));
    }

    #[test]
    fn refresh_reports_state_of_monitored_regions() {
        let recorder = Arc::new(Recorder::default());
        let mut manager = quiet_manager();
        manager.set_delegate(&recorder);
        manager.monitor_mut().move_to(Coordinate::new(1.0, 1.0));
        manager
            .add_geofences(&[fence("home", 1.0, 1.0, 100.0), fence("work", 2.0, 2.0, 50.0)])
            .unwrap();
        manager.process_events();
        manager.monitor_mut().take_calls();
        recorder.take();

        manager.refresh_geofences().unwrap();

        assert_eq!(
            manager.monitor_mut().take_calls(),
            vec![
                MonitorCall::RequestState(fence("home", 1.0, 1.0, 100.0)),
                MonitorCall::RequestState(fence("work", 2.0, 2.0, 50.0)),
            ]
        );
        manager.process_events();
        assert_eq!(
            recorder.take(),
            vec![
                Note::Inside("home".to_string()),
                Note::Outside("work".to_string()),
            ]
        );
        assert_eq!(manager.state(), ManagerState::Idle);
        assert_eq!(manager.monitored().len(), 2);
    }

    #[test]
    fn refresh_runs_preflight() {
        let mut manager = quiet_manager();
        manager.add_geofences(&[fence("home", 1.0, 1.0, 100.0)]).unwrap();
        manager.process_events();
        manager.monitor_mut().take_calls();
        manager.monitor_mut().set_location_services_enabled(false);

        assert_eq!(
            manager.refresh_geofences(),
            Err(ManagerError::LocationServicesDisabled)
        );
        assert_eq!(manager.state(), ManagerState::Failed);
        assert!(manager.monitor_mut().take_calls().is_empty());
        assert!(manager.is_monitoring("home"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ManagerConfig {
            history_capacity: 0,
            ..ManagerConfig::default()
        };

        let result = GeofenceManager::with_config(SimulatedMonitor::new(), config);

        assert!(matches!(
            result,
            Err(ConfigError::Invalid { ref key, .. }) if key == "history_capacity"
        ));
    }

    #[test]
    fn reload_without_data_source_is_a_no_op() {
        let mut manager = quiet_manager();
        assert!(manager.reload_geofences().is_ok());
        assert_eq!(manager.state(), ManagerState::Idle);
        assert!(manager.monitor_mut().take_calls().is_empty());
    }

    #[test]
    fn dropped_collaborators_are_not_kept_alive() {
        let mut manager = quiet_manager();
        let source = Arc::new(FixedSource(Mutex::new(vec![fence("home", 1.0, 1.0, 100.0)])));
        let recorder = Arc::new(Recorder::default());
        manager.set_data_source(&source);
        manager.set_delegate(&recorder);

        assert_eq!(Arc::strong_count(&source), 1);
        assert_eq!(Arc::strong_count(&recorder), 1);

        drop(source);
        drop(recorder);

        assert!(manager.reload_geofences().is_ok());
        assert!(manager.active().is_empty());
    }

    #[test]
    fn reload_reconciles_with_data_source() {
        let mut manager = quiet_manager();
        let source = Arc::new(FixedSource(Mutex::new(vec![
            fence("home", 1.0, 1.0, 100.0),
            fence("work", 2.0, 2.0, 50.0),
        ])));
        manager.set_data_source(&source);

        manager.reload_geofences().unwrap();
        manager.process_events();
        assert_eq!(manager.monitored().len(), 2);

        source.0.lock().unwrap().clear();
        manager.reload_geofences().unwrap();

        assert!(manager.active().is_empty());
        assert_eq!(manager.state(), ManagerState::Idle);
    }

    #[test]
    fn silent_delegate_receives_everything_without_effect() {
        let silent = Arc::new(Silent);
        let mut manager = GeofenceManager::new(SimulatedMonitor::new());
        manager.set_delegate(&silent);
        manager
            .monitor_mut()
            .fail_region("cafe", MonitorError::Platform("rejected".to_string()));

        manager
            .add_geofences(&[fence("home", 1.0, 1.0, 100.0), fence("cafe", 3.0, 3.0, 25.0)])
            .unwrap();
        manager.monitor_mut().move_to(Coordinate::new(1.0, 1.0));
        while manager.process_events() > 0 {}

        assert_eq!(manager.state(), ManagerState::Failed);
    }

    #[test]
    fn history_records_only_changes() {
        let mut manager = quiet_manager();
        manager.add_geofences(&[fence("home", 1.0, 1.0, 100.0)]).unwrap();
        manager.process_events();
        manager.add_geofences(&[fence("home", 1.0, 1.0, 100.0)]).unwrap();

        let path = manager.history().get_path();
        assert_eq!(
            path,
            vec![&ManagerState::Idle, &ManagerState::Processing, &ManagerState::Idle]
        );
        assert!(manager.history().transitions().iter().all(|t| t.request == 1));
    }

    #[test]
    fn history_is_bounded_by_config() {
        let config = ManagerConfig {
            history_capacity: 2,
            request_initial_state: false,
            ..ManagerConfig::default()
        };
        let mut manager = GeofenceManager::with_config(SimulatedMonitor::new(), config).unwrap();

        for radius in [10.0, 20.0, 30.0] {
            manager.add_geofences(&[fence("home", 1.0, 1.0, radius)]).unwrap();
            manager.process_events();
        }

        assert_eq!(manager.history().transitions().len(), 2);
        assert_eq!(manager.history().last().map(|t| t.request), Some(3));
    }
}
