//! Clipped surrogate and value regression losses.
//!
//! The policy ratio is taken directly between the current and recorded
//! action-distribution outputs, elementwise over the whole distribution:
//!
//! r = π_new(s) / (π_old(s) + ε)
//! L^CLIP = -mean( min(r * A, clip(r, 1-ε_c, 1+ε_c) * A) )
//!
//! The advantage of step t is broadcast across every action channel of that
//! step. The objective does not select the taken action's component.
//!
//! Scalar versions mirror the tensor versions for logging and testing.

use burn::tensor::{backend::Backend, Tensor};

/// Clipped surrogate loss over flat row-major distributions (scalar version).
///
/// # Arguments
///
/// * `new_dist` - Current policy outputs [n * action_dim]
/// * `old_dist` - Outputs recorded at collection time [n * action_dim]
/// * `advantages` - Standardized advantages [n]
/// * `clip_ratio` - Clipping ratio ε (typically 0.2)
/// * `epsilon` - Additive guard on the old distribution (typically 1e-8)
///
/// # Returns
///
/// Negative mean of the clipped surrogate (for minimization)
pub fn ppo_clip_loss_scalar(
    new_dist: &[f32],
    old_dist: &[f32],
    advantages: &[f32],
    clip_ratio: f32,
    epsilon: f32,
) -> f32 {
    assert_eq!(new_dist.len(), old_dist.len());

    let n = advantages.len();
    if n == 0 || new_dist.is_empty() {
        return 0.0;
    }
    assert_eq!(new_dist.len() % n, 0, "distribution width must divide evenly");
    let action_dim = new_dist.len() / n;

    let total: f32 = new_dist
        .iter()
        .zip(old_dist.iter())
        .enumerate()
        .map(|(i, (new_p, old_p))| {
            let advantage = advantages[i / action_dim];
            let ratio = new_p / (old_p + epsilon);
            let clipped = ratio.clamp(1.0 - clip_ratio, 1.0 + clip_ratio);
            (ratio * advantage).min(clipped * advantage)
        })
        .sum();

    -total / new_dist.len() as f32
}

/// Clipped surrogate loss (tensor version, differentiable w.r.t. `new_dist`).
///
/// # Arguments
///
/// * `new_dist` - Current policy outputs [batch, action_dim]
/// * `old_dist` - Recorded outputs (detached) [batch, action_dim]
/// * `advantages` - Standardized advantages (detached) [batch]
///
/// # Returns
///
/// Scalar loss tensor with a single element
pub fn ppo_clip_loss<B: Backend>(
    new_dist: Tensor<B, 2>,
    old_dist: Tensor<B, 2>,
    advantages: Tensor<B, 1>,
    clip_ratio: f32,
    epsilon: f32,
) -> Tensor<B, 1> {
    let [_, action_dim] = new_dist.dims();

    let ratio = new_dist / old_dist.add_scalar(epsilon);
    let clipped_ratio = ratio.clone().clamp(1.0 - clip_ratio, 1.0 + clip_ratio);

    // [batch] -> [batch, action_dim]
    let advantages = advantages.unsqueeze_dim::<2>(1).repeat_dim(1, action_dim);

    let surr1 = ratio * advantages.clone();
    let surr2 = clipped_ratio * advantages;

    -surr1.min_pair(surr2).mean()
}

/// Mean squared error between value predictions and returns.
pub fn value_loss<B: Backend>(values: Tensor<B, 1>, returns: Tensor<B, 1>) -> Tensor<B, 1> {
    (returns - values).powf_scalar(2.0).mean()
}

/// Mean squared error (scalar version).
pub fn value_loss_scalar(values: &[f32], returns: &[f32]) -> f32 {
    let n = values.len();
    assert_eq!(returns.len(), n);

    if n == 0 {
        return 0.0;
    }

    let sse: f32 = values
        .iter()
        .zip(returns.iter())
        .map(|(v, r)| (r - v).powi(2))
        .sum();

    sse / n as f32
}
