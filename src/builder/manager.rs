//! Builder for constructing geofence managers.

use crate::builder::error::BuildError;
use crate::checkpoint::ManagerCheckpoint;
use crate::config::ManagerConfig;
use crate::delegate::{GeofenceDataSource, GeofenceDelegate};
use crate::manager::GeofenceManager;
use crate::monitor::RegionMonitor;
use crate::validation::{RegionRules, RegionRulesBuilder};
use std::sync::{Arc, Weak};

/// Builder for constructing a [`GeofenceManager`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use geofence_manager::builder::GeofenceManagerBuilder;
/// use geofence_manager::config::ManagerConfig;
/// use geofence_manager::monitor::SimulatedMonitor;
///
/// let manager = GeofenceManagerBuilder::new()
///     .monitor(SimulatedMonitor::new())
///     .config(ManagerConfig {
///         max_regions: 5,
///         ..ManagerConfig::default()
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(manager.rules().max_regions(), Some(5));
/// ```
pub struct GeofenceManagerBuilder<M: RegionMonitor> {
    monitor: Option<M>,
    config: ManagerConfig,
    rules: Option<RegionRulesBuilder>,
    delegate: Option<Weak<dyn GeofenceDelegate>>,
    data_source: Option<Weak<dyn GeofenceDataSource>>,
    checkpoint: Option<ManagerCheckpoint>,
}

impl<M: RegionMonitor> GeofenceManagerBuilder<M> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            monitor: None,
            config: ManagerConfig::default(),
            rules: None,
            delegate: None,
            data_source: None,
            checkpoint: None,
        }
    }

    /// Set the platform monitor (required).
    pub fn monitor(mut self, monitor: M) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use custom region rules instead of the ones derived from the config.
    pub fn rules(mut self, rules: RegionRulesBuilder) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Register a delegate. Only a weak reference is kept, so the caller
    /// must keep its own `Arc` alive.
    pub fn delegate<D: GeofenceDelegate + 'static>(mut self, delegate: &Arc<D>) -> Self {
        let weak: Weak<D> = Arc::downgrade(delegate);
        self.delegate = Some(weak);
        self
    }

    /// Register a data source, held weakly like the delegate.
    pub fn data_source<S: GeofenceDataSource + 'static>(mut self, data_source: &Arc<S>) -> Self {
        let weak: Weak<S> = Arc::downgrade(data_source);
        self.data_source = Some(weak);
        self
    }

    /// Start from a previously saved checkpoint.
    pub fn resume_from(mut self, checkpoint: ManagerCheckpoint) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    /// Build the manager.
    /// Returns an error if the monitor is missing or the config or checkpoint is invalid.
    pub fn build(self) -> Result<GeofenceManager<M>, BuildError> {
        let monitor = self.monitor.ok_or(BuildError::MissingMonitor)?;
        self.config.validate()?;

        let rules: RegionRules = self
            .rules
            .unwrap_or_else(|| RegionRulesBuilder::from_config(&self.config))
            .build();

        let mut manager = GeofenceManager::with_rules(monitor, self.config, rules);

        if let Some(checkpoint) = self.checkpoint {
            checkpoint.validate()?;
            manager.resume(checkpoint);
        }
        manager.delegate = self.delegate;
        manager.data_source = self.data_source;

        Ok(manager)
    }
}

impl<M: RegionMonitor> Default for GeofenceManagerBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}
