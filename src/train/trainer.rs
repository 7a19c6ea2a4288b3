use std::error::Error as StdError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use serde::{Serialize, Deserialize};

use crate::data::dataset::DataSet;
use crate::error::{EngineError, Result};
use crate::network::network::Network;
use crate::optim::momentum::{MomentumSgd, Velocity};
use crate::train::epoch_stats::SweepStats;
use crate::train::learning_rule::{LearningRule, TrainingState};
use crate::train::loop_fn::{backprop_sweep, lms_sweep, sweep_error};
use crate::train::train_config::LearningParams;

/// Error type a sweep listener may return to abort training.
pub type ListenerError = Box<dyn StdError + Send + Sync>;

/// Callback invoked synchronously after every completed sweep.
pub type SweepListener<'a> = Box<dyn FnMut(&SweepStats) -> std::result::Result<(), ListenerError> + 'a>;

/// Summary of a finished training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingOutcome {
    pub state: TrainingState,
    pub iterations: usize,
    pub total_error: f64,
}

/// A learning rule bound to one network for the duration of a training run.
///
/// The trainer holds the only mutable borrow of the network, so nothing else
/// can read or write weights while it exists.
pub struct Trainer<'a> {
    network: &'a mut Network,
    rule: LearningRule,
    params: LearningParams,
    state: TrainingState,
    current_iteration: usize,
    total_error: f64,
    velocity: Velocity,
    listener: Option<SweepListener<'a>>,
    stop_flag: Option<Arc<AtomicBool>>,
}

impl<'a> Trainer<'a> {
    pub fn new(network: &'a mut Network, rule: LearningRule, params: LearningParams) -> Trainer<'a> {
        let velocity = Velocity::zeros_like(network);
        Trainer {
            network,
            rule,
            params,
            state: TrainingState::Idle,
            current_iteration: 0,
            total_error: 0.0,
            velocity,
            listener: None,
            stop_flag: None,
        }
    }

    pub fn momentum_backpropagation(network: &'a mut Network, params: LearningParams) -> Trainer<'a> {
        Trainer::new(network, LearningRule::MomentumBackpropagation, params)
    }

    pub fn back_propagation(network: &'a mut Network, params: LearningParams) -> Trainer<'a> {
        Trainer::new(network, LearningRule::BackPropagation, params)
    }

    pub fn lms(network: &'a mut Network, params: LearningParams) -> Trainer<'a> {
        Trainer::new(network, LearningRule::Lms, params)
    }

    /// Registers the sweep listener, replacing any previous one.
    pub fn set_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&SweepStats) -> std::result::Result<(), ListenerError> + 'a,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&SweepStats) -> std::result::Result<(), ListenerError> + 'a,
    {
        self.set_listener(listener);
        self
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Flag observed between sweeps; once set, training ends as `Stopped`.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    pub fn rule(&self) -> LearningRule {
        self.rule
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn current_iteration(&self) -> usize {
        self.current_iteration
    }

    pub fn total_error(&self) -> f64 {
        self.total_error
    }

    pub fn network(&self) -> &Network {
        &*self.network
    }

    /// Trains until the sweep error reaches `max_error`, `max_iterations`
    /// sweeps have run, or the stop flag is raised.
    ///
    /// Every sweep applies all row updates before the error is measured and
    /// the termination check runs. Errors leave the trainer `Idle` with the
    /// weights as they were after the last completed row.
    pub fn learn(&mut self, dataset: &DataSet) -> Result<TrainingOutcome> {
        self.params.validate()?;
        self.rule.check_network(&*self.network)?;
        self.check_dataset(dataset)?;

        self.current_iteration = 0;
        self.total_error = 0.0;
        self.velocity.reset();
        self.state = TrainingState::Running;

        let optimizer = MomentumSgd::new(
            self.params.learning_rate,
            self.rule.effective_momentum(self.params.momentum),
        );
        info!(
            "{:?} training started: {} rows, lr {}, momentum {}, max error {}",
            self.rule, dataset.len(), optimizer.learning_rate, optimizer.momentum, self.params.max_error
        );

        let result = self.run(dataset, &optimizer);
        if result.is_err() {
            self.state = TrainingState::Idle;
        }
        result
    }

    fn run(&mut self, dataset: &DataSet, optimizer: &MomentumSgd) -> Result<TrainingOutcome> {
        let t_total = Instant::now();

        while !self.state.is_terminal() {
            if self.stop_requested() {
                self.state = TrainingState::Stopped;
                info!("training stopped after {} sweeps", self.current_iteration);
                break;
            }

            let t_start = Instant::now();

            // ── One full pass over the training data ───────────────────────
            match self.rule {
                LearningRule::BackPropagation | LearningRule::MomentumBackpropagation => {
                    backprop_sweep(self.network, dataset, optimizer, &mut self.velocity)?
                }
                LearningRule::Lms => lms_sweep(self.network, dataset, optimizer, &mut self.velocity)?,
            }

            self.total_error = sweep_error(&*self.network, dataset)?;
            self.current_iteration += 1;

            if !self.total_error.is_finite() {
                return Err(EngineError::Divergence {
                    iteration: self.current_iteration,
                    error: self.total_error,
                });
            }

            // ── Termination check ─────────────────────────────────────────
            self.state = if self.total_error <= self.params.max_error {
                TrainingState::Converged
            } else if self.current_iteration >= self.params.max_iterations {
                TrainingState::IterationLimitReached
            } else {
                TrainingState::Running
            };

            // ── Notify ────────────────────────────────────────────────────
            let stats = SweepStats {
                iteration: self.current_iteration,
                total_error: self.total_error,
                state: self.state,
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            };
            debug!("{}. iteration | total network error: {}", stats.iteration, stats.total_error);

            if let Some(listener) = self.listener.as_mut() {
                listener(&stats).map_err(EngineError::Listener)?;
            }
        }

        info!(
            "training finished as {:?} after {} sweeps (total error {}, {} ms)",
            self.state, self.current_iteration, self.total_error, t_total.elapsed().as_millis()
        );

        Ok(TrainingOutcome {
            state: self.state,
            iterations: self.current_iteration,
            total_error: self.total_error,
        })
    }

    fn stop_requested(&self) -> bool {
        self.stop_flag.as_ref().map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    fn check_dataset(&self, dataset: &DataSet) -> Result<()> {
        if dataset.is_empty() {
            return Err(EngineError::config("training dataset is empty"));
        }
        if dataset.input_size() != self.network.input_size() {
            return Err(EngineError::Validation {
                what: "dataset input",
                expected: self.network.input_size(),
                actual: dataset.input_size(),
            });
        }
        if dataset.output_size() != self.network.output_size() {
            return Err(EngineError::Validation {
                what: "dataset output",
                expected: self.network.output_size(),
                actual: dataset.output_size(),
            });
        }
        Ok(())
    }
}
