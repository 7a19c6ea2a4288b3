use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::transfer::TransferFunction};

/// One fully-connected layer after the input layer.
///
/// `weights[(j, i)]` is the connection from neuron `i` of the previous layer
/// to neuron `j` of this one. The transfer function is owned by the network
/// and passed in, so every layer applies the same one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer{
    pub size: usize,
    pub weights: Matrix,
    pub biases: Vec<f64>,
    #[serde(skip)]
    net: Vec<f64>,  // weighted input sums, needed for the derivative
    #[serde(skip)]
    output: Vec<f64>,
}

impl Layer {
    pub fn new<R: Rng + ?Sized>(size: usize, input_size: usize, rng: &mut R) -> Layer {
        let weights = Matrix::random(size, input_size, rng);
        let biases = (0..size).map(|_| rng.gen::<f64>() - 0.5).collect();
        Layer::from_parts(weights, biases)
    }

    /// Assembles a layer from existing parameters (used by the loaders).
    pub fn from_parts(weights: Matrix, biases: Vec<f64>) -> Layer {
        let size = biases.len();
        Layer {
            size,
            weights,
            biases,
            net: vec![0.0; size],
            output: vec![0.0; size],
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.cols
    }

    pub fn net(&self) -> &[f64] {
        &self.net
    }

    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Forward step that caches net inputs and activations for backprop.
    pub fn feed_from(&mut self, input: &[f64], transfer: TransferFunction) -> &[f64] {
        self.net = self.net_input(input);
        self.output = self.net.iter().map(|&z| transfer.function(z)).collect();
        &self.output
    }

    /// Forward step without touching the cache.
    pub fn evaluate(&self, input: &[f64], transfer: TransferFunction) -> Vec<f64> {
        self.net_input(input).into_iter().map(|z| transfer.function(z)).collect()
    }

    /// Local error per neuron: `upstream ⊙ f'(net)`, where `upstream` is the
    /// error signal in activation space for this layer.
    pub fn local_errors(&self, upstream: &[f64], transfer: TransferFunction) -> Vec<f64> {
        debug_assert_eq!(upstream.len(), self.size);
        upstream.iter().zip(&self.net)
            .map(|(e, &z)| e * transfer.derivative(z))
            .collect()
    }

    /// Error signal for the previous layer's activations: `Wᵀ · δ`.
    pub fn back_propagate(&self, local_errors: &[f64]) -> Vec<f64> {
        self.weights.transpose_mul_vec(local_errors)
    }

    /// Clears cached activations; called after deserialisation.
    pub(crate) fn reset_cache(&mut self) {
        self.net = vec![0.0; self.size];
        self.output = vec![0.0; self.size];
    }

    fn net_input(&self, input: &[f64]) -> Vec<f64> {
        self.weights.mul_vec(input)
            .into_iter()
            .zip(&self.biases)
            .map(|(sum, b)| sum + b)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn fixed_layer() -> Layer {
        Layer::from_parts(
            Matrix::from_data(vec![
                vec![1.0, -1.0, 0.5],
                vec![2.0, -1.0, 2.0],
            ]),
            vec![0.0, 0.0],
        )
    }

    #[test]
    fn feed_from_matches_hand_computed_sigmoid() {
        let mut layer = fixed_layer();
        let out = layer.feed_from(&[1.0, 0.5, -0.5], TransferFunction::Sigmoid).to_vec();
        assert_abs_diff_eq!(out[0], 0.5621765008857981, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], 0.6224593312018546, epsilon = 1e-12);
        assert_eq!(layer.net(), &[0.25, 0.5]);
    }

    #[test]
    fn evaluate_leaves_cache_untouched() {
        let layer = fixed_layer();
        let out = layer.evaluate(&[1.0, 0.5, -0.5], TransferFunction::Identity);
        assert_eq!(out, vec![0.25, 0.5]);
        assert_eq!(layer.output(), &[0.0, 0.0]);
    }

    #[test]
    fn local_errors_and_back_propagation() {
        let mut layer = fixed_layer();
        layer.feed_from(&[1.0, 0.5, -0.5], TransferFunction::Identity);
        let deltas = layer.local_errors(&[1.0, -2.0], TransferFunction::Identity);
        assert_eq!(deltas, vec![1.0, -2.0]);
        assert_eq!(layer.back_propagate(&deltas), vec![-3.0, 1.0, -3.5]);
    }
}
