//! Learning components for PPO navigation.
//!
//! - `advantage`: Monte-Carlo returns and advantage standardization
//! - `policy_loss`: Clipped surrogate and value regression losses
//! - `ppo_agent`: Policy/value networks with their optimisers and update rules

pub mod advantage;
pub mod policy_loss;
pub mod ppo_agent;

#[cfg(test)]
mod tests;

pub use advantage::{compute_advantages, discounted_returns, normalize_advantages};
pub use policy_loss::{ppo_clip_loss, ppo_clip_loss_scalar, value_loss, value_loss_scalar};
pub use ppo_agent::{ActionSelection, PPOAgent, UpdateStats};
