//! Top-level error type for training.
//!
//! Environment or gradient failures are fatal and propagate to the caller;
//! recoverable conditions (missing sensor channels, missing checkpoints) are
//! handled where they occur and never surface here.

use std::fmt;
use std::io;

use crate::buffers::BufferError;
use crate::checkpoint::CheckpointError;
use crate::config::ConfigError;
use crate::environment::EnvError;

/// Error raised by the agent or the training loop.
#[derive(Debug)]
pub enum TrainError {
    /// Invalid configuration.
    Config(ConfigError),
    /// Simulator reset or step failed.
    Environment(EnvError),
    /// Checkpoint save failed.
    Checkpoint(CheckpointError),
    /// Training log could not be written.
    Log(io::Error),
    /// A transition violated the trajectory width invariant.
    Buffer(BufferError),
    /// Input width does not match what the networks expect.
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    /// Tensor data could not be read back from the backend.
    Tensor(String),
    /// Update requested on a trajectory with no transitions.
    EmptyTrajectory,
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainError::Config(e) => write!(f, "Config error: {}", e),
            TrainError::Environment(e) => write!(f, "Environment error: {}", e),
            TrainError::Checkpoint(e) => write!(f, "Checkpoint error: {}", e),
            TrainError::Log(e) => write!(f, "Training log error: {}", e),
            TrainError::Buffer(e) => write!(f, "Trajectory error: {}", e),
            TrainError::ShapeMismatch { field, expected, got } => {
                write!(f, "{} length mismatch: expected {}, got {}", field, expected, got)
            }
            TrainError::Tensor(e) => write!(f, "Tensor error: {}", e),
            TrainError::EmptyTrajectory => write!(f, "Cannot update on an empty trajectory"),
        }
    }
}

impl std::error::Error for TrainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrainError::Config(e) => Some(e),
            TrainError::Environment(e) => Some(e.as_ref()),
            TrainError::Checkpoint(e) => Some(e),
            TrainError::Log(e) => Some(e),
            TrainError::Buffer(e) => Some(e),
            TrainError::ShapeMismatch { .. }
            | TrainError::Tensor(_)
            | TrainError::EmptyTrajectory => None,
        }
    }
}

impl From<ConfigError> for TrainError {
    fn from(e: ConfigError) -> Self {
        TrainError::Config(e)
    }
}

impl From<EnvError> for TrainError {
    fn from(e: EnvError) -> Self {
        TrainError::Environment(e)
    }
}

impl From<CheckpointError> for TrainError {
    fn from(e: CheckpointError) -> Self {
        TrainError::Checkpoint(e)
    }
}

impl From<BufferError> for TrainError {
    fn from(e: BufferError) -> Self {
        TrainError::Buffer(e)
    }
}

impl From<io::Error> for TrainError {
    fn from(e: io::Error) -> Self {
        TrainError::Log(e)
    }
}
