//! Monte-Carlo advantage estimation.
//!
//! Returns are the full discounted sum of future rewards inside one episode;
//! advantages subtract the value baseline. There is no λ-smoothing and no
//! bootstrapping from a final value: the trajectory is always a complete
//! episode.
//!
//! ## Formula
//!
//! G_t = r_t + γ G_{t+1},  G_{T-1} = r_{T-1}
//! A_t = G_t - V(s_t)

/// Discounted returns computed backward over one episode.
pub fn discounted_returns(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let mut returns = vec![0.0f32; rewards.len()];
    let mut running = 0.0f32;

    for t in (0..rewards.len()).rev() {
        running = rewards[t] + gamma * running;
        returns[t] = running;
    }

    returns
}

/// Compute advantages and returns for one episode.
///
/// # Arguments
///
/// * `rewards` - rewards received [T]
/// * `values` - value estimates V(s_t) [T]
/// * `gamma` - discount factor
///
/// # Returns
///
/// (advantages, returns) - both [T], advantages not yet normalized
pub fn compute_advantages(rewards: &[f32], values: &[f32], gamma: f32) -> (Vec<f32>, Vec<f32>) {
    assert_eq!(values.len(), rewards.len());

    let returns = discounted_returns(rewards, gamma);
    let advantages = returns
        .iter()
        .zip(values.iter())
        .map(|(g, v)| g - v)
        .collect();

    (advantages, returns)
}

/// Standardize advantages in place: (a - mean) / (std + epsilon).
///
/// Uses the population standard deviation. A batch with zero spread
/// (including a single element) maps to all zeros instead of dividing by zero.
pub fn normalize_advantages(advantages: &mut [f32], epsilon: f32) {
    if advantages.is_empty() {
        return;
    }

    let n = advantages.len() as f32;
    let mean = advantages.iter().sum::<f32>() / n;
    let variance = advantages.iter().map(|a| (a - mean).powi(2)).sum::<f32>() / n;
    let std = variance.sqrt();

    if !mean.is_finite() || !std.is_finite() {
        log::warn!(
            "Non-finite advantage statistics: mean={}, std={}. Leaving advantages raw.",
            mean,
            std
        );
        return;
    }

    for a in advantages.iter_mut() {
        *a = (*a - mean) / (std + epsilon);
    }
}
