//! Errors raised while assembling a manager.

use crate::checkpoint::CheckpointError;
use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Region monitor not specified. Call .monitor(monitor) before .build()")]
    MissingMonitor,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Cannot resume from checkpoint: {0}")]
    InvalidCheckpoint(#[from] CheckpointError),
}
