use serde::{Serialize, Deserialize};

use crate::train::learning_rule::TrainingState;

/// Per-sweep training statistics handed to the sweep listener.
///
/// One `SweepStats` value is produced at the end of every completed sweep,
/// after the termination check, so `state` on the last notification tells
/// `Converged` apart from `IterationLimitReached`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepStats {
    /// 1-based sweep number.
    pub iteration: usize,
    /// Mean squared error over every training row and output, measured after
    /// all of this sweep's updates.
    pub total_error: f64,
    /// State of the learning rule after this sweep.
    pub state: TrainingState,
    /// Wall-clock duration of this single sweep in milliseconds.
    pub elapsed_ms: u64,
}
