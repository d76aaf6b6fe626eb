//! Manager configuration.
//!
//! Values are layered: built-in defaults, then a TOML file, then environment
//! variables. Later layers only override the keys they set.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading or checking configuration
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Failed to parse TOML: {0}")]
    Parse(String),

    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: String, reason: String },
}

/// Tunables for a [`GeofenceManager`](crate::GeofenceManager).
///
/// # Example
///
/// ```rust
/// use geofence_manager::config::ManagerConfig;
///
/// let config = ManagerConfig::from_toml_str(
///     r#"
///     max_regions = 10
///     max_radius = 2000.0
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(config.max_regions, 10);
/// assert_eq!(config.max_radius, Some(2000.0));
/// assert!(config.request_initial_state);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Upper bound on the number of regions in a desired set.
    pub max_regions: usize,
    /// Largest radius in metres. The platform's own limit still applies.
    pub max_radius: Option<f64>,
    /// Ask the platform where the device is once a region is monitored.
    pub request_initial_state: bool,
    /// Number of state transitions kept in the history.
    pub history_capacity: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_regions: 20,
            max_radius: None,
            request_initial_state: true,
            history_capacity: 100,
        }
    }
}

impl ManagerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ManagerConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Apply `GEOFENCE_*` environment variables over the current values.
    ///
    /// Unparsable values are logged and ignored. The result is validated, so
    /// a value that parses but is out of range is an error.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(value) = env::var("GEOFENCE_MAX_REGIONS") {
            match value.parse::<usize>() {
                Ok(max) => self.max_regions = max,
                Err(_) => tracing::warn!(
                    "Invalid GEOFENCE_MAX_REGIONS value '{}': expected a positive integer",
                    value
                ),
            }
        }

        if let Ok(value) = env::var("GEOFENCE_MAX_RADIUS") {
            match value.parse::<f64>() {
                Ok(radius) => self.max_radius = Some(radius),
                Err(_) => tracing::warn!(
                    "Invalid GEOFENCE_MAX_RADIUS value '{}': expected metres",
                    value
                ),
            }
        }

        if let Ok(value) = env::var("GEOFENCE_REQUEST_INITIAL_STATE") {
            match value.parse::<bool>() {
                Ok(flag) => self.request_initial_state = flag,
                Err(_) => tracing::warn!(
                    "Invalid GEOFENCE_REQUEST_INITIAL_STATE value '{}': expected true or false",
                    value
                ),
            }
        }

        if let Ok(value) = env::var("GEOFENCE_HISTORY_CAPACITY") {
            match value.parse::<usize>() {
                Ok(capacity) => self.history_capacity = capacity,
                Err(_) => tracing::warn!(
                    "Invalid GEOFENCE_HISTORY_CAPACITY value '{}': expected a positive integer",
                    value
                ),
            }
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_regions == 0 {
            return Err(ConfigError::Invalid {
                key: "max_regions".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "history_capacity".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if let Some(radius) = self.max_radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(ConfigError::Invalid {
                    key: "max_radius".to_string(),
                    reason: format!("{} is not a positive distance", radius),
                });
            }
        }

        Ok(())
    }
}
