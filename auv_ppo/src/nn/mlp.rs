//! Fully connected network with ReLU hidden layers and a linear head.
//!
//! # Usage
//!
//! ```ignore
//! use auv_ppo::nn::{Mlp, MlpConfig};
//!
//! let mlp: Mlp<Backend> = MlpConfig::new(36, 5)
//!     .with_hidden(vec![128, 128, 64, 64])
//!     .init(&device);
//!
//! let output = mlp.forward(input); // [batch, 5]
//! ```

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Configuration for [`Mlp`].
#[derive(Debug, Clone)]
pub struct MlpConfig {
    /// Number of input features.
    pub d_input: usize,
    /// Hidden layer widths, in order.
    pub hidden: Vec<usize>,
    /// Number of output features.
    pub d_output: usize,
}

impl MlpConfig {
    /// Create a config with no hidden layers (a single linear map).
    pub fn new(d_input: usize, d_output: usize) -> Self {
        Self {
            d_input,
            hidden: Vec::new(),
            d_output,
        }
    }

    /// Set the hidden layer widths.
    pub fn with_hidden(mut self, hidden: Vec<usize>) -> Self {
        self.hidden = hidden;
        self
    }

    /// Initialize the network.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let mut layers = Vec::with_capacity(self.hidden.len());
        let mut d_in = self.d_input;
        for &width in &self.hidden {
            layers.push(LinearConfig::new(d_in, width).init(device));
            d_in = width;
        }

        Mlp {
            layers,
            head: LinearConfig::new(d_in, self.d_output).init(device),
        }
    }
}

/// ReLU multilayer perceptron with an unbounded output layer.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    layers: Vec<Linear<B>>,
    head: Linear<B>,
}

impl<B: Backend> Mlp<B> {
    /// Forward pass: [batch, d_input] -> [batch, d_output]
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self
            .layers
            .iter()
            .fold(input, |x, layer| relu(layer.forward(x)));
        self.head.forward(x)
    }

    /// Number of hidden layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Width of the input layer.
    pub fn d_input(&self) -> usize {
        self.layers.first().unwrap_or(&self.head).weight.val().dims()[0]
    }

    pub fn d_output(&self) -> usize {
        self.head.weight.val().dims()[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let mlp: Mlp<TestBackend> = MlpConfig::new(6, 3).with_hidden(vec![8, 4]).init(&device);
        assert_eq!(mlp.depth(), 2);
        assert_eq!((mlp.d_input(), mlp.d_output()), (6, 3));

        let input = Tensor::random([5, 6], Distribution::Normal(0.0, 1.0), &device);
        assert_eq!(mlp.forward(input).dims(), [5, 3]);
    }

    #[test]
    fn test_no_hidden_is_linear() {
        let device = Default::default();
        let mlp: Mlp<TestBackend> = MlpConfig::new(2, 1).init(&device);
        assert_eq!(mlp.depth(), 0);
        assert_eq!((mlp.d_input(), mlp.d_output()), (2, 1));

        // f(0) is the bias; f(x) - f(0) is linear in x
        let zero = Tensor::<TestBackend, 2>::zeros([1, 2], &device);
        let x = Tensor::<TestBackend, 2>::from_floats([[1.0, 2.0]], &device);
        let two_x = Tensor::<TestBackend, 2>::from_floats([[2.0, 4.0]], &device);

        let f0 = mlp.forward(zero);
        let fx = mlp.forward(x) - f0.clone();
        let f2x = mlp.forward(two_x) - f0;
        let diff: f32 = (f2x - fx.mul_scalar(2.0)).abs().sum().into_scalar();
        assert!(diff < 1e-4);
    }
}
