use serde::{Serialize, Deserialize};

use crate::loss::{mae::MaeLoss, mse::MseLoss};

/// Scalar error metric for training and evaluation.
///
/// - `MeanSquared`:  average of squared per-output differences.
/// - `MeanAbsolute`: average of absolute per-output differences.
///
/// Both average over every row and every output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMetric {
    MeanSquared,
    MeanAbsolute,
}

impl ErrorMetric {
    /// Mean error over the outputs of a single pattern.
    pub fn pattern_error(&self, predicted: &[f64], expected: &[f64]) -> f64 {
        match self {
            ErrorMetric::MeanSquared  => MseLoss::loss(predicted, expected),
            ErrorMetric::MeanAbsolute => MaeLoss::loss(predicted, expected),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorMetric::MeanSquared  => "mean squared error",
            ErrorMetric::MeanAbsolute => "mean absolute error",
        }
    }
}

/// Running mean of pattern errors.
#[derive(Debug, Clone)]
pub struct ErrorAccumulator {
    metric: ErrorMetric,
    sum: f64,
    patterns: usize,
}

impl ErrorAccumulator {
    pub fn new(metric: ErrorMetric) -> Self {
        ErrorAccumulator { metric, sum: 0.0, patterns: 0 }
    }

    pub fn add(&mut self, predicted: &[f64], expected: &[f64]) {
        self.sum += self.metric.pattern_error(predicted, expected);
        self.patterns += 1;
    }

    pub fn metric(&self) -> ErrorMetric {
        self.metric
    }

    pub fn patterns(&self) -> usize {
        self.patterns
    }

    /// Mean over all added patterns; `0.0` before the first one.
    pub fn total_error(&self) -> f64 {
        if self.patterns == 0 { 0.0 } else { self.sum / self.patterns as f64 }
    }
}
