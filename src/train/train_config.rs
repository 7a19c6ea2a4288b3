use serde::{Serialize, Deserialize};

use crate::error::{EngineError, Result};

/// Hyperparameters for a learning rule.
///
/// # Fields
/// - `learning_rate`:  step size, must be `> 0`
/// - `momentum`:       fraction of the previous update re-applied, in `[0, 1)`;
///                      `0` disables momentum
/// - `max_error`:      training stops as `Converged` once the sweep error is
///                      at or below this value, must be `>= 0`
/// - `max_iterations`: sweep cap, must be `>= 1`; the default is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningParams {
    pub learning_rate: f64,
    pub momentum: f64,
    pub max_error: f64,
    pub max_iterations: usize,
}

impl Default for LearningParams {
    fn default() -> Self {
        LearningParams {
            learning_rate: 0.1,
            momentum: 0.25,
            max_error: 0.01,
            max_iterations: usize::MAX,
        }
    }
}

impl LearningParams {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn with_max_error(mut self, max_error: f64) -> Self {
        self.max_error = max_error;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(EngineError::config(format!(
                "learning rate must be a finite value > 0, got {}", self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(EngineError::config(format!(
                "momentum must be in [0, 1), got {}", self.momentum
            )));
        }
        if !(self.max_error >= 0.0) {
            return Err(EngineError::config(format!(
                "max error must be >= 0, got {}", self.max_error
            )));
        }
        if self.max_iterations == 0 {
            return Err(EngineError::config("max iterations must be at least 1"));
        }
        Ok(())
    }

    /// Reads parameters from a JSON file; missing fields take their defaults.
    pub fn load_json(path: impl AsRef<std::path::Path>) -> Result<LearningParams> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
