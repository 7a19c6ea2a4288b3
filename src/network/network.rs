use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::{activation::transfer::TransferFunction, layers::dense::Layer};
use crate::error::{EngineError, Result};

/// Fixed-topology feed-forward network.
///
/// Layer 0 is the input layer and owns no weights; `layers` holds every
/// subsequent fully-connected layer in order. Topology and transfer function
/// are fixed at construction, only the weights change during training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    transfer: TransferFunction,
    input_size: usize,
    layers: Vec<Layer>,
    #[serde(skip)]
    input: Vec<f64>,
}

impl Network {
    /// Builds a network from layer sizes (input first), with weights and
    /// biases drawn uniformly from `[-0.5, 0.5)` using the thread RNG.
    pub fn new(transfer: TransferFunction, layer_sizes: &[usize]) -> Result<Network> {
        Network::with_rng(transfer, layer_sizes, &mut rand::thread_rng())
    }

    /// Same as [`Network::new`] but reproducible for a given seed.
    pub fn with_seed(transfer: TransferFunction, layer_sizes: &[usize], seed: u64) -> Result<Network> {
        Network::with_rng(transfer, layer_sizes, &mut StdRng::seed_from_u64(seed))
    }

    pub fn with_rng<R: Rng + ?Sized>(
        transfer: TransferFunction,
        layer_sizes: &[usize],
        rng: &mut R,
    ) -> Result<Network> {
        if layer_sizes.len() < 2 {
            return Err(EngineError::config(format!(
                "a network needs an input and an output layer, got {} layer size(s)",
                layer_sizes.len()
            )));
        }
        if let Some(pos) = layer_sizes.iter().position(|&s| s == 0) {
            return Err(EngineError::config(format!("layer {} has zero neurons", pos)));
        }

        let layers = layer_sizes.windows(2)
            .map(|pair| Layer::new(pair[1], pair[0], rng))
            .collect();

        Ok(Network {
            transfer,
            input_size: layer_sizes[0],
            layers,
            input: vec![0.0; layer_sizes[0]],
        })
    }

    /// Multi-layer perceptron with the default sigmoid transfer function.
    pub fn multilayer_perceptron(layer_sizes: &[usize]) -> Result<Network> {
        Network::new(TransferFunction::Sigmoid, layer_sizes)
    }

    /// Single linear unit (identity transfer, no hidden layer) for LMS training.
    pub fn adaline(input_size: usize) -> Result<Network> {
        Network::new(TransferFunction::Identity, &[input_size, 1])
    }

    /// Reassembles a network from deserialised layers. Every layer must have
    /// one bias and one weight row per neuron, and every weight row one entry
    /// per neuron of the layer before it.
    pub fn from_layers(
        transfer: TransferFunction,
        input_size: usize,
        layers: Vec<Layer>,
    ) -> Result<Network> {
        if input_size == 0 || layers.is_empty() {
            return Err(EngineError::config("network needs a non-empty input layer and at least one further layer"));
        }
        let mut prev = input_size;
        for (idx, layer) in layers.iter().enumerate() {
            if layer.size == 0 {
                return Err(EngineError::config(format!("layer {} has zero neurons", idx + 1)));
            }
            check_layer_shape(layer, prev)?;
            prev = layer.size;
        }
        let mut network = Network { transfer, input_size, layers, input: Vec::new() };
        network.reset_activations();
        Ok(network)
    }

    pub fn transfer(&self) -> TransferFunction {
        self.transfer
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.size)
    }

    /// Neuron counts for every layer, input layer first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        std::iter::once(self.input_size)
            .chain(self.layers.iter().map(|l| l.size))
            .collect()
    }

    /// Number of layers between input and output.
    pub fn hidden_layer_count(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    /// The weighted layers, i.e. every layer except the input layer.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Weight of the connection into neuron `neuron` of `layer` from neuron
    /// `input` of the previous layer. `layer` counts the input layer as 0.
    ///
    /// # Panics
    ///
    /// If `layer` is 0 (the input layer has no weights) or any index is out
    /// of range.
    pub fn weight(&self, layer: usize, neuron: usize, input: usize) -> f64 {
        self.weighted_layer(layer).weights[(neuron, input)]
    }

    /// Bias of neuron `neuron` of `layer`, counting the input layer as 0.
    ///
    /// # Panics
    ///
    /// If `layer` is 0 or any index is out of range.
    pub fn bias(&self, layer: usize, neuron: usize) -> f64 {
        self.weighted_layer(layer).biases[neuron]
    }

    fn weighted_layer(&self, layer: usize) -> &Layer {
        assert!(
            (1..=self.layers.len()).contains(&layer),
            "layer {} carries no weights; weighted layers are 1..={}",
            layer,
            self.layers.len()
        );
        &self.layers[layer - 1]
    }

    pub fn set_input(&mut self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_size {
            return Err(EngineError::Validation {
                what: "input vector",
                expected: self.input_size,
                actual: input.len(),
            });
        }
        self.input.clear();
        self.input.extend_from_slice(input);
        Ok(())
    }

    /// Current input-layer activations.
    pub fn input(&self) -> &[f64] {
        &self.input
    }

    /// Propagates the stored input through every layer, caching activations.
    pub fn calculate(&mut self) {
        let transfer = self.transfer;
        for i in 0..self.layers.len() {
            let (layer, prev) = self.layer_and_inputs_mut(i);
            layer.feed_from(prev, transfer);
        }
    }

    /// Weighted layer `i` (0 = first layer after the input) together with
    /// the cached activations feeding it.
    pub(crate) fn layer_and_inputs_mut(&mut self, i: usize) -> (&mut Layer, &[f64]) {
        let (done, rest) = self.layers.split_at_mut(i);
        let inputs = match done.last() {
            Some(layer) => layer.output(),
            None => &self.input[..],
        };
        (&mut rest[0], inputs)
    }

    /// Output-layer activations from the last `calculate`.
    pub fn output(&self) -> &[f64] {
        self.layers.last().map_or(&[][..], |l| l.output())
    }

    /// Activations of layer `layer` (0 = input) from the last `calculate`.
    ///
    /// # Panics
    ///
    /// If `layer` exceeds the number of weighted layers.
    pub fn activations(&self, layer: usize) -> &[f64] {
        if layer == 0 { &self.input[..] } else { self.weighted_layer(layer).output() }
    }

    /// `set_input`, `calculate` and `output` in one call.
    pub fn forward(&mut self, input: &[f64]) -> Result<&[f64]> {
        self.set_input(input)?;
        self.calculate();
        Ok(self.output())
    }

    /// Pure forward pass; leaves stored activations untouched.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_size {
            return Err(EngineError::Validation {
                what: "input vector",
                expected: self.input_size,
                actual: input.len(),
            });
        }
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.evaluate(&current, self.transfer);
        }
        Ok(current)
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: impl AsRef<std::path::Path>) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let parsed: Network = serde_json::from_reader(reader)?;
        Network::from_layers(parsed.transfer, parsed.input_size, parsed.layers)
    }

    fn reset_activations(&mut self) {
        self.input = vec![0.0; self.input_size];
        for layer in &mut self.layers {
            layer.reset_cache();
        }
    }
}

/// Shape agreement between a layer's declared size, its parameters and the
/// `fan_in` of the layer before it.
fn check_layer_shape(layer: &Layer, fan_in: usize) -> Result<()> {
    let mismatch = |what: &'static str, expected: usize, actual: usize| -> Result<()> {
        Err(EngineError::Validation { what, expected, actual })
    };

    if layer.biases.len() != layer.size {
        return mismatch("layer biases", layer.size, layer.biases.len());
    }
    if layer.weights.rows != layer.size {
        return mismatch("layer weight rows", layer.size, layer.weights.rows);
    }
    if layer.input_size() != fan_in {
        return mismatch("layer fan-in", fan_in, layer.input_size());
    }
    if layer.weights.data.len() != layer.weights.rows {
        return mismatch("weight matrix rows", layer.weights.rows, layer.weights.data.len());
    }
    if let Some(row) = layer.weights.data.iter().find(|row| row.len() != fan_in) {
        return mismatch("weight row", fan_in, row.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;
    use approx::assert_abs_diff_eq;

    #[test]
    fn construction_wires_fan_in_to_previous_layer() {
        let net = Network::with_seed(TransferFunction::Tanh, &[4, 6, 3], 1).unwrap();
        assert_eq!(net.layer_sizes(), vec![4, 6, 3]);
        assert_eq!(net.layers()[0].weights.cols, 4);
        assert_eq!(net.layers()[1].weights.cols, 6);
        assert_eq!(net.hidden_layer_count(), 1);
        assert_eq!(net.output_size(), 3);
    }

    #[test]
    fn same_seed_gives_same_weights() {
        let a = Network::with_seed(TransferFunction::Sigmoid, &[2, 3, 1], 11).unwrap();
        let b = Network::with_seed(TransferFunction::Sigmoid, &[2, 3, 1], 11).unwrap();
        assert_eq!(a.layers()[0].weights, b.layers()[0].weights);
        assert_eq!(a.layers()[1].biases, b.layers()[1].biases);
    }

    #[test]
    fn rejects_degenerate_topologies() {
        assert!(matches!(
            Network::new(TransferFunction::Sigmoid, &[3]),
            Err(EngineError::Configuration(_))
        ));
        assert!(matches!(
            Network::new(TransferFunction::Sigmoid, &[3, 0, 1]),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn set_input_validates_length() {
        let mut net = Network::with_seed(TransferFunction::Sigmoid, &[2, 1], 0).unwrap();
        let err = net.set_input(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, EngineError::Validation { expected: 2, actual: 3, .. }));
        assert!(net.predict(&[1.0]).is_err());
    }

    #[test]
    fn calculate_uses_bias_plus_weighted_sum() {
        let layers = vec![Layer::from_parts(
            Matrix::from_data(vec![vec![0.5, -1.0]]),
            vec![0.25],
        )];
        let mut net = Network::from_layers(TransferFunction::Identity, 2, layers).unwrap();
        let out = net.forward(&[2.0, 1.0]).unwrap().to_vec();
        assert_abs_diff_eq!(out[0], 0.25 + 1.0 - 1.0);
        assert_eq!(net.weight(1, 0, 1), -1.0);
        assert_eq!(net.bias(1, 0), 0.25);
    }

    #[test]
    fn calculate_is_idempotent_and_matches_predict() {
        let mut net = Network::with_seed(TransferFunction::Tanh, &[3, 4, 2], 5).unwrap();
        let input = [0.2, -0.7, 0.9];
        net.set_input(&input).unwrap();
        net.calculate();
        let first = net.output().to_vec();
        net.calculate();
        assert_eq!(net.output(), first.as_slice());
        assert_eq!(net.predict(&input).unwrap(), first);
    }

    #[test]
    fn from_layers_rejects_mismatched_fan_in() {
        let layers = vec![
            Layer::from_parts(Matrix::zeros(3, 2), vec![0.0; 3]),
            Layer::from_parts(Matrix::zeros(1, 4), vec![0.0]),
        ];
        assert!(matches!(
            Network::from_layers(TransferFunction::Sigmoid, 2, layers),
            Err(EngineError::Validation { expected: 3, actual: 4, .. })
        ));
    }

    #[test]
    fn load_json_rejects_parts_that_disagree() {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = [
            // no bias for the single output neuron
            r#"{"transfer":"sigmoid","input_size":1,"layers":[{"size":1,"weights":{"rows":1,"cols":1,"data":[[1.0]]},"biases":[]}]}"#,
            // two neurons declared, one bias and one weight row supplied
            r#"{"transfer":"sigmoid","input_size":1,"layers":[{"size":2,"weights":{"rows":2,"cols":1,"data":[[1.0]]},"biases":[0.0]}]}"#,
            // rows/cols agree with size, data is ragged
            r#"{"transfer":"identity","input_size":2,"layers":[{"size":1,"weights":{"rows":1,"cols":2,"data":[[1.0]]},"biases":[0.0]}]}"#,
        ];
        for (i, json) in snapshots.iter().enumerate() {
            let path = dir.path().join(format!("bad{}.json", i));
            std::fs::write(&path, json).unwrap();
            assert!(
                matches!(Network::load_json(&path), Err(EngineError::Validation { .. })),
                "snapshot {} was accepted",
                i
            );
        }
    }

    #[test]
    fn from_layers_checks_bias_and_row_lengths() {
        let mut short = Layer::from_parts(Matrix::zeros(2, 1), vec![0.0; 2]);
        short.biases.pop();
        assert!(matches!(
            Network::from_layers(TransferFunction::Sigmoid, 1, vec![short]),
            Err(EngineError::Validation { what: "layer biases", expected: 2, actual: 1 })
        ));

        let ragged = vec![Layer::from_parts(Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0]]), vec![0.0; 2])];
        assert!(matches!(
            Network::from_layers(TransferFunction::Sigmoid, 2, ragged),
            Err(EngineError::Validation { what: "weight row", expected: 2, actual: 1 })
        ));
    }

    #[test]
    #[should_panic(expected = "carries no weights")]
    fn input_layer_has_no_weight() {
        let net = Network::with_seed(TransferFunction::Sigmoid, &[2, 1], 0).unwrap();
        net.weight(0, 0, 0);
    }

    #[test]
    fn activations_of_input_layer_are_the_input() {
        let mut net = Network::with_seed(TransferFunction::Sigmoid, &[2, 1], 0).unwrap();
        net.forward(&[0.25, 0.75]).unwrap();
        assert_eq!(net.activations(0), &[0.25, 0.75]);
        assert_eq!(net.activations(1), net.output());
    }
}
