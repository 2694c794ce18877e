//! Behavioral tests for the algorithms module.
//!
//! # Test Organization
//!
//! - `advantage_tests`: Discounted returns and advantage standardization
//! - `policy_loss_tests`: Clipped surrogate and value losses
//! - `integration_tests`: Agent action selection and learning phase

pub mod policy_loss_tests;
