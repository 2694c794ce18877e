//! Neural network estimators.
//!
//! - [`mlp`]: ReLU multilayer perceptron building block
//! - [`networks`]: Policy and value networks for the vehicle

pub mod mlp;
pub mod networks;

pub use mlp::{Mlp, MlpConfig};
pub use networks::{PolicyNet, ValueNet, POLICY_HIDDEN, VALUE_HIDDEN};
