//! Policy and value estimators for underwater navigation.
//!
//! - [`PolicyNet`]: observation [36] -> raw action-distribution output [5]
//! - [`ValueNet`]: observation [36] -> scalar state value [1]
//!
//! The policy head is linear: outputs are unbounded and double as the
//! "distribution" recorded for the clipped surrogate.

use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::mlp::{Mlp, MlpConfig};
use crate::core::transition::{ACTION_SIZE, OBS_SIZE};

/// Hidden widths of the policy network.
pub const POLICY_HIDDEN: [usize; 4] = [128, 128, 64, 64];

/// Hidden widths of the value network.
pub const VALUE_HIDDEN: [usize; 2] = [64, 64];

/// Action-distribution estimator.
#[derive(Module, Debug)]
pub struct PolicyNet<B: Backend> {
    mlp: Mlp<B>,
}

impl<B: Backend> PolicyNet<B> {
    /// Create with the standard observation/action sizes.
    pub fn new(device: &B::Device) -> Self {
        Self::with_sizes(OBS_SIZE, ACTION_SIZE, device)
    }

    pub fn with_sizes(obs_size: usize, action_size: usize, device: &B::Device) -> Self {
        Self {
            mlp: MlpConfig::new(obs_size, action_size)
                .with_hidden(POLICY_HIDDEN.to_vec())
                .init(device),
        }
    }

    pub fn obs_size(&self) -> usize {
        self.mlp.d_input()
    }

    pub fn action_size(&self) -> usize {
        self.mlp.d_output()
    }

    /// [batch, obs] -> [batch, action]
    pub fn forward(&self, obs: Tensor<B, 2>) -> Tensor<B, 2> {
        self.mlp.forward(obs)
    }
}

/// State-value estimator.
#[derive(Module, Debug)]
pub struct ValueNet<B: Backend> {
    mlp: Mlp<B>,
}

impl<B: Backend> ValueNet<B> {
    pub fn new(device: &B::Device) -> Self {
        Self::with_obs_size(OBS_SIZE, device)
    }

    pub fn with_obs_size(obs_size: usize, device: &B::Device) -> Self {
        Self {
            mlp: MlpConfig::new(obs_size, 1)
                .with_hidden(VALUE_HIDDEN.to_vec())
                .init(device),
        }
    }

    pub fn obs_size(&self) -> usize {
        self.mlp.d_input()
    }

    /// [batch, obs] -> [batch, 1]
    pub fn forward(&self, obs: Tensor<B, 2>) -> Tensor<B, 2> {
        self.mlp.forward(obs)
    }

    /// [batch, obs] -> [batch]
    pub fn forward_flat(&self, obs: Tensor<B, 2>) -> Tensor<B, 1> {
        self.forward(obs).flatten(0, 1)
    }
}
