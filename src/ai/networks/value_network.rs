use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Feed-forward value approximator.
///
/// ```text
/// Input:  [batch, cells]     one f32 per board cell (1.0 peg / 0.0 hole)
/// Hidden: configurable widths, ReLU
/// Output: [batch, 1]         state-value estimate, no activation
/// ```
#[derive(Module, Debug)]
pub struct ValueNetwork<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
    activation: Relu,
}

#[derive(Config, Debug)]
pub struct ValueNetworkConfig {
    pub input_size: usize,
    pub hidden_sizes: Vec<usize>,
}

impl ValueNetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ValueNetwork<B> {
        let mut hidden = Vec::with_capacity(self.hidden_sizes.len());
        let mut width = self.input_size;
        for &next in &self.hidden_sizes {
            hidden.push(LinearConfig::new(width, next).init(device));
            width = next;
        }
        ValueNetwork {
            hidden,
            output: LinearConfig::new(width, 1).init(device),
            activation: Relu::new(),
        }
    }
}

impl<B: Backend> ValueNetwork<B> {
    /// Forward pass: input [batch, cells] -> output [batch, 1].
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        for layer in &self.hidden {
            x = self.activation.forward(layer.forward(x));
        }
        self.output.forward(x)
    }

    /// All linear layers in a fixed order, hidden first then output. The
    /// eligibility traces of the gradient-eligibility step are kept aligned
    /// with this order.
    pub fn layers(&self) -> impl Iterator<Item = &Linear<B>> {
        self.hidden.iter().chain(std::iter::once(&self.output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_network_output_shape() {
        let device = Default::default();
        let config = ValueNetworkConfig::new(15, vec![20, 30, 5]);
        let network = config.init::<TestBackend>(&device);

        let input = Tensor::zeros([2, 15], &device);
        let output = network.forward(input);
        assert_eq!(output.shape().dims, [2, 1]);
    }

    #[test]
    fn test_network_no_hidden_layers() {
        let device = Default::default();
        let config = ValueNetworkConfig::new(6, vec![]);
        let network = config.init::<TestBackend>(&device);

        let input = Tensor::zeros([1, 6], &device);
        let output = network.forward(input);
        assert_eq!(output.shape().dims, [1, 1]);
    }

    #[test]
    fn test_layer_order_matches_widths() {
        let device = Default::default();
        let config = ValueNetworkConfig::new(6, vec![4, 3]);
        let network = config.init::<TestBackend>(&device);

        let widths: Vec<[usize; 2]> = network
            .layers()
            .map(|l| {
                let dims = l.weight.val().shape().dims;
                [dims[0], dims[1]]
            })
            .collect();
        assert_eq!(widths, vec![[6, 4], [4, 3], [3, 1]]);
    }
}
