use serde::{Serialize, Deserialize};

use crate::activation::transfer::TransferFunction;
use crate::error::Result;
use crate::network::network::Network;

/// A serializable description of a network architecture, kept apart from
/// trained weights so drivers can store configurations before training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name, also used as a file stem by drivers.
    pub name: String,
    pub transfer: TransferFunction,
    /// Neuron count per layer, input layer first.
    pub layer_sizes: Vec<usize>,
    /// Optional class labels for the output layer, in output order.
    #[serde(default)]
    pub class_labels: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NetworkSpec {
    pub fn new(name: impl Into<String>, transfer: TransferFunction, layer_sizes: Vec<usize>) -> Self {
        NetworkSpec {
            name: name.into(),
            transfer,
            layer_sizes,
            class_labels: None,
            description: None,
        }
    }

    pub fn with_class_labels(mut self, labels: Vec<String>) -> Self {
        self.class_labels = Some(labels);
        self
    }

    /// Constructs a freshly initialised network for this architecture.
    /// With `seed` the initial weights are reproducible.
    pub fn build(&self, seed: Option<u64>) -> Result<Network> {
        match seed {
            Some(seed) => Network::with_seed(self.transfer, &self.layer_sizes, seed),
            None => Network::new(self.transfer, &self.layer_sizes),
        }
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<std::path::Path>) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_json() {
        let json = r#"{"name":"iris","transfer":"tanh","layer_sizes":[4,2,3]}"#;
        let spec: NetworkSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.transfer, TransferFunction::Tanh);
        assert_eq!(spec.class_labels, None);
        let net = spec.build(Some(1)).unwrap();
        assert_eq!(net.layer_sizes(), vec![4, 2, 3]);
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");
        let spec = NetworkSpec::new("wine", TransferFunction::Sigmoid, vec![11, 20, 15, 10])
            .with_class_labels((1..=10).map(|i| i.to_string()).collect());
        spec.save_json(&path).unwrap();
        assert_eq!(NetworkSpec::load_json(&path).unwrap(), spec);
    }
}
