use serde::{Serialize, Deserialize};
use std::f64::consts::E;
use std::fmt;

/// Network-wide neuron nonlinearity. The set is closed; every variant is a
/// pure function of the neuron's net input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferFunction {
    Identity,
    Sigmoid,
    Tanh,
}

impl TransferFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            TransferFunction::Identity => x,
            TransferFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            TransferFunction::Tanh => x.tanh(),
        }
    }

    /// Derivative evaluated at the net input `x` (not at the output).
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            TransferFunction::Identity => 1.0,
            TransferFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            TransferFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
        }
    }

    /// Stable identifier used by the binary network layout.
    pub fn id(&self) -> u8 {
        match self {
            TransferFunction::Identity => 0,
            TransferFunction::Sigmoid => 1,
            TransferFunction::Tanh => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<TransferFunction> {
        match id {
            0 => Some(TransferFunction::Identity),
            1 => Some(TransferFunction::Sigmoid),
            2 => Some(TransferFunction::Tanh),
            _ => None,
        }
    }
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferFunction::Identity => "identity",
            TransferFunction::Sigmoid => "sigmoid",
            TransferFunction::Tanh => "tanh",
        };
        f.write_str(name)
    }
}
