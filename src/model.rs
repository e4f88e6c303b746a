//! The function approximator: a tanh MLP mapping the independent variables to
//! every declared output (dependent variables and inferred parameters alike).

use burn::module::Module;
use burn::nn::{Linear, LinearConfig, Tanh};
use burn::prelude::Backend;
use burn::tensor::Tensor;

#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
    activation: Tanh,
}

impl<B: Backend> Model<B> {
    /// `inputs` and `outputs` come from the problem declaration; width and
    /// depth from the training config.
    pub fn new(
        device: &B::Device,
        inputs: usize,
        outputs: usize,
        hidden_size: usize,
        hidden_layers: usize,
    ) -> Self {
        let mut hidden = Vec::new();
        hidden.push(LinearConfig::new(inputs, hidden_size).init(device));
        for _ in 1..hidden_layers {
            hidden.push(LinearConfig::new(hidden_size, hidden_size).init(device));
        }
        Self {
            hidden,
            output: LinearConfig::new(hidden_size, outputs).init(device),
            activation: Tanh::new(),
        }
    }

    /// Forward pass: rows are sample points, columns are outputs in
    /// declaration order.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        for layer in &self.hidden {
            x = self.activation.forward(layer.forward(x));
        }
        self.output.forward(x)
    }
}
