use serde::{Serialize, Deserialize};

use crate::activation::transfer::TransferFunction;
use crate::error::{EngineError, Result};
use crate::network::network::Network;

/// The supported learning rules. All share one sweep/termination loop and
/// differ only in how a row's error is turned into weight updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningRule {
    /// Backpropagation without momentum.
    BackPropagation,
    /// Backpropagation with a momentum term on every connection.
    MomentumBackpropagation,
    /// Least mean squares for a single linear layer (Adaline).
    Lms,
}

impl LearningRule {
    /// Momentum actually applied for the configured value.
    pub fn effective_momentum(&self, configured: f64) -> f64 {
        match self {
            LearningRule::MomentumBackpropagation => configured,
            LearningRule::BackPropagation | LearningRule::Lms => 0.0,
        }
    }

    /// LMS needs a linear unit with no hidden layers; backpropagation takes
    /// any topology.
    pub fn check_network(&self, network: &Network) -> Result<()> {
        if *self != LearningRule::Lms {
            return Ok(());
        }
        if network.hidden_layer_count() != 0 {
            return Err(EngineError::config(format!(
                "LMS trains a single layer, network has {} hidden layer(s)",
                network.hidden_layer_count()
            )));
        }
        if network.transfer() != TransferFunction::Identity {
            return Err(EngineError::config(format!(
                "LMS needs the identity transfer function, network uses {}",
                network.transfer()
            )));
        }
        Ok(())
    }
}

/// Lifecycle of a training run.
///
/// `Idle → Running → {Converged | IterationLimitReached | Stopped}`. A run
/// that fails with an error returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingState {
    Idle,
    Running,
    /// Sweep error reached `max_error`.
    Converged,
    /// `max_iterations` sweeps ran without converging. Not an error.
    IterationLimitReached,
    /// The stop flag was raised between sweeps.
    Stopped,
}

impl TrainingState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TrainingState::Converged | TrainingState::IterationLimitReached | TrainingState::Stopped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lms_requires_single_linear_layer() {
        let adaline = Network::adaline(3).unwrap();
        assert!(LearningRule::Lms.check_network(&adaline).is_ok());

        let hidden = Network::new(TransferFunction::Identity, &[3, 2, 1]).unwrap();
        assert!(LearningRule::Lms.check_network(&hidden).is_err());

        let sigmoid = Network::new(TransferFunction::Sigmoid, &[3, 1]).unwrap();
        assert!(LearningRule::Lms.check_network(&sigmoid).is_err());
        assert!(LearningRule::BackPropagation.check_network(&sigmoid).is_ok());
    }

    #[test]
    fn only_momentum_rule_keeps_momentum() {
        assert_eq!(LearningRule::MomentumBackpropagation.effective_momentum(0.7), 0.7);
        assert_eq!(LearningRule::BackPropagation.effective_momentum(0.7), 0.0);
        assert_eq!(LearningRule::Lms.effective_momentum(0.7), 0.0);
    }

    #[test]
    fn terminal_states() {
        assert!(!TrainingState::Idle.is_terminal());
        assert!(!TrainingState::Running.is_terminal());
        assert!(TrainingState::Converged.is_terminal());
        assert!(TrainingState::IterationLimitReached.is_terminal());
        assert!(TrainingState::Stopped.is_terminal());
    }
}
