//! Tests for the clipped surrogate and value losses.

use burn::backend::{Autodiff, NdArray};
use burn::tensor::{ElementConversion, Tensor};

use crate::algorithms::policy_loss::{
    ppo_clip_loss, ppo_clip_loss_scalar, value_loss, value_loss_scalar,
};

type TestBackend = NdArray<f32>;
type TestAutodiffBackend = Autodiff<NdArray<f32>>;

// ============================================================================
// Clipping
// ============================================================================

/// Positive advantage: ratio above 1+ε is capped at (1+ε)A.
#[test]
fn test_positive_advantage_clipped_above() {
    let loss = ppo_clip_loss_scalar(&[2.0], &[1.0], &[1.0], 0.2, 0.0);
    assert!((loss + 1.2).abs() < 1e-6, "expected -1.2, got {}", loss);
}

/// Negative advantage: ratio below 1-ε contributes (1-ε)A.
#[test]
fn test_negative_advantage_clipped_below() {
    let loss = ppo_clip_loss_scalar(&[0.5], &[1.0], &[-1.0], 0.2, 0.0);
    assert!((loss - 0.8).abs() < 1e-6, "expected 0.8, got {}", loss);
}

/// Negative advantage with a large ratio stays unclipped (pessimistic bound).
#[test]
fn test_negative_advantage_large_ratio_unclipped() {
    let loss = ppo_clip_loss_scalar(&[2.0], &[1.0], &[-1.0], 0.2, 0.0);
    assert!((loss - 2.0).abs() < 1e-6, "expected 2.0, got {}", loss);
}

#[test]
fn test_ratio_inside_band_is_unclipped() {
    let loss = ppo_clip_loss_scalar(&[1.1], &[1.0], &[2.0], 0.2, 0.0);
    assert!((loss + 2.2).abs() < 1e-5, "expected -2.2, got {}", loss);
}

// ============================================================================
// Tensor / Scalar Agreement
// ============================================================================

#[test]
fn test_tensor_loss_matches_scalar() {
    let device = Default::default();
    let new_dist = [0.4, 1.5, -0.2, 0.9, 2.0, 0.3];
    let old_dist = [0.5, 1.0, 0.1, 1.2, 1.0, 0.6];
    let advantages = [1.0, -0.5, 0.25];

    let expected = ppo_clip_loss_scalar(&new_dist, &old_dist, &advantages, 0.2, 1e-8);

    let loss = ppo_clip_loss(
        Tensor::<TestBackend, 1>::from_floats(new_dist, &device).reshape([3, 2]),
        Tensor::<TestBackend, 1>::from_floats(old_dist, &device).reshape([3, 2]),
        Tensor::<TestBackend, 1>::from_floats(advantages, &device),
        0.2,
        1e-8,
    );
    let got = loss.into_scalar().elem::<f32>();

    assert!(
        (got - expected).abs() < 1e-5,
        "tensor loss {} should match scalar loss {}",
        got,
        expected
    );
}

#[test]
fn test_value_loss_matches_scalar() {
    let device = Default::default();
    let values = [0.5, -1.0, 2.0];
    let returns = [1.0, 1.0, 1.0];

    let expected = value_loss_scalar(&values, &returns);
    let got = value_loss(
        Tensor::<TestBackend, 1>::from_floats(values, &device),
        Tensor::<TestBackend, 1>::from_floats(returns, &device),
    )
    .into_scalar()
    .elem::<f32>();

    // (0.25 + 4 + 1) / 3
    assert!((expected - 1.75).abs() < 1e-6);
    assert!((got - expected).abs() < 1e-6);
}

// ============================================================================
// Gradient Flow
// ============================================================================

#[test]
fn test_gradient_flows_to_new_distribution() {
    let device = Default::default();
    let new_dist = Tensor::<TestAutodiffBackend, 2>::from_floats([[1.0, 1.0], [1.0, 1.0]], &device)
        .require_grad();
    let old_dist = Tensor::<TestAutodiffBackend, 2>::from_floats([[1.0, 1.0], [1.0, 1.0]], &device);
    let advantages = Tensor::<TestAutodiffBackend, 1>::from_floats([1.0, -1.0], &device);

    let loss = ppo_clip_loss(new_dist.clone(), old_dist, advantages, 0.2, 0.0);
    let grads = loss.backward();
    let grad = new_dist
        .grad(&grads)
        .expect("new distribution should receive a gradient");

    let grad = grad.into_data().to_vec::<f32>().unwrap();
    // d/dx of -mean(x * A) at ratio 1: -A / 4
    assert!((grad[0] + 0.25).abs() < 1e-6, "grad {:?}", grad);
    assert!((grad[2] - 0.25).abs() < 1e-6, "grad {:?}", grad);
}
