//! Append-only trajectory buffer for one episode.
//!
//! Key characteristics:
//! - Preserves temporal ordering
//! - Enforces identical vector widths across all transitions
//! - Consumed by value into a read-only [`TrajectoryBatch`]

use std::fmt;

use crate::core::transition::Transition;

/// Rejected transition.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferError {
    /// A vector field does not match the width fixed by the first transition.
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::DimensionMismatch { field, expected, got } => {
                write!(f, "{} width mismatch: expected {}, got {}", field, expected, got)
            }
        }
    }
}

impl std::error::Error for BufferError {}

/// Widths fixed by the first transition of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Dims {
    state: usize,
    action: usize,
    distribution: usize,
}

impl Dims {
    fn of(t: &Transition) -> Self {
        Self {
            state: t.state.len(),
            action: t.action.len(),
            distribution: t.action_distribution.len(),
        }
    }

    fn check(&self, t: &Transition) -> Result<(), BufferError> {
        let got = Dims::of(t);
        for (field, expected, got) in [
            ("state", self.state, got.state),
            ("action", self.action, got.action),
            ("action_distribution", self.distribution, got.distribution),
        ] {
            if expected != got {
                return Err(BufferError::DimensionMismatch { field, expected, got });
            }
        }
        Ok(())
    }
}

/// Collects one episode's transitions.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryBuffer {
    transitions: Vec<Transition>,
    dims: Option<Dims>,
}

impl TrajectoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-allocated capacity (typically the step budget).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transitions: Vec::with_capacity(capacity),
            dims: None,
        }
    }

    /// Append a transition.
    ///
    /// The first transition fixes the state, action and distribution widths;
    /// later transitions must match them.
    pub fn push(&mut self, transition: Transition) -> Result<(), BufferError> {
        match self.dims {
            Some(dims) => dims.check(&transition)?,
            None => self.dims = Some(Dims::of(&transition)),
        }
        self.transitions.push(transition);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Sum of rewards collected so far.
    pub fn total_reward(&self) -> f32 {
        self.transitions.iter().map(|t| t.reward).sum()
    }

    /// Transitions in temporal order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Finish collection and hand the episode to the update stage.
    pub fn consume(self) -> TrajectoryBatch {
        let dims = self.dims.unwrap_or(Dims {
            state: 0,
            action: 0,
            distribution: 0,
        });
        TrajectoryBatch {
            transitions: self.transitions,
            obs_dim: dims.state,
            action_dim: dims.action,
        }
    }
}

/// Read-only view of a finished episode, laid out for tensor construction.
#[derive(Debug, Clone)]
pub struct TrajectoryBatch {
    transitions: Vec<Transition>,
    obs_dim: usize,
    action_dim: usize,
}

impl TrajectoryBatch {
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn obs_dim(&self) -> usize {
        self.obs_dim
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// All states as a flat row-major vector [len * obs_dim].
    pub fn states(&self) -> Vec<f32> {
        self.transitions
            .iter()
            .flat_map(|t| t.state.iter().copied())
            .collect()
    }

    /// All raw actions as a flat row-major vector [len * action_dim].
    pub fn actions(&self) -> Vec<f32> {
        self.transitions
            .iter()
            .flat_map(|t| t.action.iter().copied())
            .collect()
    }

    /// All recorded action distributions, flat [len * action_dim].
    pub fn action_distributions(&self) -> Vec<f32> {
        self.transitions
            .iter()
            .flat_map(|t| t.action_distribution.iter().copied())
            .collect()
    }

    pub fn rewards(&self) -> Vec<f32> {
        self.transitions.iter().map(|t| t.reward).collect()
    }

    pub fn dones(&self) -> Vec<bool> {
        self.transitions.iter().map(|t| t.done).collect()
    }

    pub fn total_reward(&self) -> f32 {
        self.transitions.iter().map(|t| t.reward).sum()
    }
}
