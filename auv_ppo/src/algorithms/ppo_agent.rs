//! PPO agent: policy and value networks with their optimisers.
//!
//! One learning phase per episode:
//!
//! ```text
//! values      = V(states)                       // before any update
//! advantages  = normalize(G - values)
//! policy step = Adam(∇ L^CLIP(π(states), π_old, advantages))
//! value step  = Adam(∇ MSE(V(states), G))
//! ```
//!
//! Both steps are single full-batch gradient steps; there are no
//! minibatches or extra epochs.

use burn::grad_clipping::GradientClippingConfig;
use burn::module::Module;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor};

use super::advantage::{compute_advantages, discounted_returns, normalize_advantages};
use super::policy_loss::{ppo_clip_loss, value_loss};
use crate::buffers::TrajectoryBatch;
use crate::config::PPOConfig;
use crate::core::ThrusterCommand;
use crate::error::TrainError;
use crate::nn::{PolicyNet, ValueNet};

/// Output of one action selection.
#[derive(Debug, Clone)]
pub struct ActionSelection {
    /// Raw policy output, one value per action channel.
    pub raw: Vec<f32>,
    /// Distribution recorded for the surrogate ratio. Same values as `raw`.
    pub distribution: Vec<f32>,
    /// Expanded and scaled thruster command.
    pub command: ThrusterCommand,
}

/// Losses reported by one learning phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateStats {
    pub policy_loss: f32,
    pub value_loss: f32,
}

/// Policy/value pair with independent Adam optimisers.
pub struct PPOAgent<B: AutodiffBackend> {
    config: PPOConfig,
    policy: PolicyNet<B>,
    value: ValueNet<B>,
    policy_optimizer: OptimizerAdaptor<Adam, PolicyNet<B>, B>,
    value_optimizer: OptimizerAdaptor<Adam, ValueNet<B>, B>,
    device: B::Device,
}

fn adam_config(max_grad_norm: Option<f32>) -> AdamConfig {
    let mut adam_config = AdamConfig::new();
    if let Some(max_norm) = max_grad_norm {
        adam_config =
            adam_config.with_grad_clipping(Some(GradientClippingConfig::Norm(max_norm)));
    }
    adam_config
}

fn check_len(field: &'static str, expected: usize, got: usize) -> Result<(), TrainError> {
    if expected != got {
        return Err(TrainError::ShapeMismatch { field, expected, got });
    }
    Ok(())
}

fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>, TrainError> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| TrainError::Tensor(format!("{:?}", e)))
}

impl<B: AutodiffBackend> PPOAgent<B> {
    /// Create an agent with freshly initialized networks.
    pub fn new(config: PPOConfig, device: &B::Device) -> Self {
        let policy = PolicyNet::new(device);
        let value = ValueNet::new(device);
        Self::from_networks(config, policy, value, device)
    }

    /// Create an agent around existing networks.
    pub fn from_networks(
        config: PPOConfig,
        policy: PolicyNet<B>,
        value: ValueNet<B>,
        device: &B::Device,
    ) -> Self {
        let policy_optimizer = adam_config(config.max_grad_norm).init();
        let value_optimizer = adam_config(config.max_grad_norm).init();
        Self {
            config,
            policy,
            value,
            policy_optimizer,
            value_optimizer,
            device: device.clone(),
        }
    }

    pub fn config(&self) -> &PPOConfig {
        &self.config
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn policy(&self) -> &PolicyNet<B> {
        &self.policy
    }

    pub fn value(&self) -> &ValueNet<B> {
        &self.value
    }

    /// Swap in restored networks. Optimiser moments are kept.
    pub fn set_networks(&mut self, policy: PolicyNet<B>, value: ValueNet<B>) {
        self.policy = policy;
        self.value = value;
    }

    /// Callers check `flat.len() == rows * cols` first.
    fn batch_tensor(&self, flat: &[f32], rows: usize, cols: usize) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(flat, &self.device).reshape([rows, cols])
    }

    /// Run the policy on one observation and expand its output into a
    /// thruster command.
    pub fn select_action(&self, observation: &[f32]) -> Result<ActionSelection, TrainError> {
        let obs_size = self.policy.obs_size();
        check_len("observation", obs_size, observation.len())?;
        let obs = self.batch_tensor(observation, 1, obs_size);
        let raw = to_vec(self.policy.forward(obs).detach())?;
        let command = ThrusterCommand::from_raw_action(&raw, self.config.action_gain);
        Ok(ActionSelection {
            distribution: raw.clone(),
            raw,
            command,
        })
    }

    /// Value estimates for `n` flat row-major observations.
    pub fn values(&self, states: &[f32], n: usize) -> Result<Vec<f32>, TrainError> {
        let obs_size = self.value.obs_size();
        check_len("states", n * obs_size, states.len())?;
        if n == 0 {
            return Ok(Vec::new());
        }
        let obs = self.batch_tensor(states, n, obs_size);
        to_vec(self.value.forward_flat(obs).detach())
    }

    /// One clipped-surrogate gradient step on the policy network.
    ///
    /// `advantages` must already be standardized. The recorded actions are
    /// only checked for width; the surrogate is taken over the whole
    /// distribution.
    pub fn update_policy(
        &mut self,
        batch: &TrajectoryBatch,
        advantages: &[f32],
    ) -> Result<f32, TrainError> {
        let n = batch.len();
        if n == 0 {
            return Err(TrainError::EmptyTrajectory);
        }
        let obs_size = self.policy.obs_size();
        let action_size = self.policy.action_size();
        check_len("advantages", n, advantages.len())?;
        check_len("actions", action_size, batch.action_dim())?;

        let states = batch.states();
        let old_dist = batch.action_distributions();
        check_len("states", n * obs_size, states.len())?;
        check_len("action_distributions", n * action_size, old_dist.len())?;

        let states = self.batch_tensor(&states, n, obs_size);
        let old_dist = self.batch_tensor(&old_dist, n, action_size);
        let advantages = Tensor::<B, 1>::from_floats(advantages, &self.device);

        let new_dist = self.policy.forward(states);
        let loss = ppo_clip_loss(
            new_dist,
            old_dist,
            advantages,
            self.config.clip_ratio,
            self.config.epsilon,
        );
        let loss_value = loss.clone().into_scalar().elem::<f32>();

        let grads = GradientsParams::from_grads(loss.backward(), &self.policy);
        self.policy = self
            .policy_optimizer
            .step(self.config.policy_lr, self.policy.clone(), grads);

        Ok(loss_value)
    }

    /// One mean-squared-error gradient step on the value network.
    pub fn update_value(
        &mut self,
        batch: &TrajectoryBatch,
        returns: &[f32],
    ) -> Result<f32, TrainError> {
        let n = batch.len();
        if n == 0 {
            return Err(TrainError::EmptyTrajectory);
        }
        let obs_size = self.value.obs_size();
        check_len("returns", n, returns.len())?;
        let states = batch.states();
        check_len("states", n * obs_size, states.len())?;

        let states = self.batch_tensor(&states, n, obs_size);
        let returns = Tensor::<B, 1>::from_floats(returns, &self.device);

        let values = self.value.forward_flat(states);
        let loss = value_loss(values, returns);
        let loss_value = loss.clone().into_scalar().elem::<f32>();

        let grads = GradientsParams::from_grads(loss.backward(), &self.value);
        self.value = self
            .value_optimizer
            .step(self.config.value_lr, self.value.clone(), grads);

        Ok(loss_value)
    }

    /// Full learning phase over one episode's trajectory.
    pub fn learn(&mut self, batch: &TrajectoryBatch) -> Result<UpdateStats, TrainError> {
        let n = batch.len();
        if n == 0 {
            return Err(TrainError::EmptyTrajectory);
        }

        let rewards = batch.rewards();
        let values = self.values(&batch.states(), n)?;
        let (mut advantages, _) = compute_advantages(&rewards, &values, self.config.gamma);
        normalize_advantages(&mut advantages, self.config.epsilon);

        let policy_loss = self.update_policy(batch, &advantages)?;

        let returns = discounted_returns(&rewards, self.config.gamma);
        let value_loss = self.update_value(batch, &returns)?;

        log::debug!(
            "PPO update over {} steps: policy_loss={:.4}, value_loss={:.4}",
            n,
            policy_loss,
            value_loss
        );

        Ok(UpdateStats {
            policy_loss,
            value_loss,
        })
    }

    /// Number of trainable parameters in both networks.
    pub fn num_params(&self) -> usize {
        self.policy.num_params() + self.value.num_params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ACTION_SIZE, OBS_SIZE, THRUSTER_COUNT};
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_select_action_shapes() {
        let device = Default::default();
        let agent = PPOAgent::<TestBackend>::new(PPOConfig::default(), &device);

        let selection = agent.select_action(&[0.1; OBS_SIZE]).unwrap();
        assert_eq!(selection.raw.len(), ACTION_SIZE);
        assert_eq!(selection.distribution, selection.raw);
        assert_eq!(selection.command.as_slice().len(), THRUSTER_COUNT);

        let cmd = selection.command.as_slice();
        for i in 0..4 {
            assert!((cmd[i] - selection.raw[4] * 50.0).abs() < 1e-4);
            assert!((cmd[4 + i] - selection.raw[i] * 50.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_values_length() {
        let device = Default::default();
        let agent = PPOAgent::<TestBackend>::new(PPOConfig::default(), &device);
        let values = agent.values(&vec![0.5; 3 * OBS_SIZE], 3).unwrap();
        assert_eq!(values.len(), 3);
        assert!(agent.values(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn test_values_rejects_partial_rows() {
        let device = Default::default();
        let agent = PPOAgent::<TestBackend>::new(PPOConfig::default(), &device);

        let err = agent.values(&[0.0; 2 * OBS_SIZE - 1], 2).unwrap_err();
        assert!(matches!(
            err,
            TrainError::ShapeMismatch { field: "states", expected, got }
                if expected == 2 * OBS_SIZE && got == 2 * OBS_SIZE - 1
        ));
        assert!(agent.values(&[0.0; OBS_SIZE], 0).is_err());
    }

    #[test]
    fn test_select_action_rejects_wrong_observation_width() {
        let device = Default::default();
        let agent = PPOAgent::<TestBackend>::new(PPOConfig::default(), &device);

        for len in [0, OBS_SIZE - 1, OBS_SIZE + 1] {
            let err = agent.select_action(&vec![0.1; len]).unwrap_err();
            assert!(
                matches!(err, TrainError::ShapeMismatch { field: "observation", got, .. } if got == len),
                "len {}: {}",
                len,
                err
            );
        }
    }
}
