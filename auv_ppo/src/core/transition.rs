//! Transition record for on-policy trajectory collection.
//!
//! A transition stores everything the update stage needs from one control
//! tick: the observation the action was chosen from, the raw (pre-expansion)
//! action, the shaped reward, the terminal flag and the action distribution
//! the policy produced at selection time.

/// Observation length: 16 (pose) + 3 (rotation) + 3 (velocity) + 14 (lasers).
pub const OBS_SIZE: usize = 36;

/// Raw action arity produced by the policy network.
pub const ACTION_SIZE: usize = 5;

/// Physical thruster channels accepted by the vehicle.
pub const THRUSTER_COUNT: usize = 8;

/// One control tick of an episode.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Observation the action was selected from [OBS_SIZE]
    pub state: Vec<f32>,
    /// Raw policy action before thruster expansion [ACTION_SIZE]
    pub action: Vec<f32>,
    /// Shaped reward for this tick
    pub reward: f32,
    /// Episode terminated on this tick (target sequence completed)
    pub done: bool,
    /// Action distribution at selection time, the "old" policy output [ACTION_SIZE]
    pub action_distribution: Vec<f32>,
}

impl Transition {
    pub fn new(
        state: Vec<f32>,
        action: Vec<f32>,
        reward: f32,
        done: bool,
        action_distribution: Vec<f32>,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            done,
            action_distribution,
        }
    }

    /// Observation length.
    pub fn state_dim(&self) -> usize {
        self.state.len()
    }

    /// Action arity.
    pub fn action_dim(&self) -> usize {
        self.action.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_dims() {
        let t = Transition::new(
            vec![0.0; OBS_SIZE],
            vec![0.1; ACTION_SIZE],
            -1.0,
            false,
            vec![0.1; ACTION_SIZE],
        );
        assert_eq!(t.state_dim(), 36);
        assert_eq!(t.action_dim(), 5);
        assert!(!t.done);
    }
}
