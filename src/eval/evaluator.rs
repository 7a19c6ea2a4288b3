use std::fmt;

use log::info;
use serde::{Serialize, Deserialize};

use crate::data::dataset::DataSet;
use crate::error::{EngineError, Result};
use crate::eval::confusion::ConfusionMatrix;
use crate::eval::metrics::{ClassificationMetrics, MetricsSummary};
use crate::loss::error_metric::{ErrorAccumulator, ErrorMetric};
use crate::network::network::Network;

// ---------------------------------------------------------------------------
// Classification modes
// ---------------------------------------------------------------------------

/// How network outputs are mapped to classes.
///
/// - `Binary`:     a single output; class 1 when `output >= threshold`,
///                  otherwise class 0. The desired value is read as class 1
///                  when it is `>= 0.5`.
/// - `MultiClass`: one output per label; the predicted class is the argmax
///                  of the outputs and the actual class the argmax of the
///                  desired one-hot vector. Ties go to the lowest index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassificationMode {
    Binary { threshold: f64, labels: [String; 2] },
    MultiClass { labels: Vec<String> },
}

impl ClassificationMode {
    /// Binary mode with classes labelled `"0"` and `"1"`.
    pub fn binary(threshold: f64) -> Self {
        ClassificationMode::Binary { threshold, labels: ["0".into(), "1".into()] }
    }

    pub fn multi_class<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        ClassificationMode::MultiClass { labels: labels.into_iter().map(Into::into).collect() }
    }

    pub fn labels(&self) -> Vec<String> {
        match self {
            ClassificationMode::Binary { labels, .. } => labels.to_vec(),
            ClassificationMode::MultiClass { labels } => labels.clone(),
        }
    }

    fn check_network(&self, network: &Network) -> Result<()> {
        let expected_outputs = match self {
            ClassificationMode::Binary { .. } => 1,
            ClassificationMode::MultiClass { labels } => {
                if labels.len() < 2 {
                    return Err(EngineError::config("multi-class evaluation needs at least two labels"));
                }
                labels.len()
            }
        };
        if network.output_size() != expected_outputs {
            return Err(EngineError::Validation {
                what: "classifier output",
                expected: expected_outputs,
                actual: network.output_size(),
            });
        }
        Ok(())
    }

    /// `(actual, predicted)` class indices for one row.
    fn classes(&self, output: &[f64], desired: &[f64]) -> (usize, usize) {
        match self {
            ClassificationMode::Binary { threshold, .. } => {
                let predicted = usize::from(output[0] >= *threshold);
                let actual = usize::from(desired[0] >= 0.5);
                (actual, predicted)
            }
            ClassificationMode::MultiClass { .. } => (argmax(desired), argmax(output)),
        }
    }
}

/// Index of the maximum element; the lowest index wins ties and NaNs never win.
pub fn argmax(v: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate().skip(1) {
        if x > v[best] || v[best].is_nan() {
            best = i;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Single-purpose evaluators
// ---------------------------------------------------------------------------

/// Runs a read-only forward pass per row and returns `metric` averaged over
/// every row and output.
pub fn error_evaluate(network: &Network, dataset: &DataSet, metric: ErrorMetric) -> Result<f64> {
    let report = Evaluation::new().with_error(metric).evaluate(network, dataset)?;
    Ok(report.error(metric).unwrap_or(0.0))
}

/// Classifies every row and accumulates the results into a confusion matrix.
pub fn classify(network: &Network, dataset: &DataSet, mode: &ClassificationMode) -> Result<ConfusionMatrix> {
    let report = Evaluation::new().with_classifier(mode.clone()).evaluate(network, dataset)?;
    Ok(report.confusion.unwrap_or_else(|| ConfusionMatrix::new(mode.labels())))
}

// ---------------------------------------------------------------------------
// Composite evaluation
// ---------------------------------------------------------------------------

/// Any number of error metrics plus at most one classifier, computed in one
/// pass over a dataset.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    metrics: Vec<ErrorMetric>,
    classifier: Option<ClassificationMode>,
}

/// Results of an [`Evaluation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub rows: usize,
    pub errors: Vec<(ErrorMetric, f64)>,
    pub confusion: Option<ConfusionMatrix>,
    pub class_metrics: Vec<ClassificationMetrics>,
    pub average: Option<MetricsSummary>,
}

impl Evaluation {
    pub fn new() -> Self {
        Evaluation::default()
    }

    pub fn with_error(mut self, metric: ErrorMetric) -> Self {
        if !self.metrics.contains(&metric) {
            self.metrics.push(metric);
        }
        self
    }

    /// Sets the classifier, replacing any previous one.
    pub fn with_classifier(mut self, mode: ClassificationMode) -> Self {
        self.classifier = Some(mode);
        self
    }

    pub fn evaluate(&self, network: &Network, dataset: &DataSet) -> Result<EvaluationReport> {
        if dataset.input_size() != network.input_size() {
            return Err(EngineError::Validation {
                what: "dataset input",
                expected: network.input_size(),
                actual: dataset.input_size(),
            });
        }
        if dataset.output_size() != network.output_size() {
            return Err(EngineError::Validation {
                what: "dataset output",
                expected: network.output_size(),
                actual: dataset.output_size(),
            });
        }
        if let Some(mode) = &self.classifier {
            mode.check_network(network)?;
        }

        let mut accumulators: Vec<ErrorAccumulator> =
            self.metrics.iter().map(|&m| ErrorAccumulator::new(m)).collect();
        let mut confusion = self.classifier.as_ref().map(|mode| ConfusionMatrix::new(mode.labels()));

        for row in dataset {
            let output = network.predict(&row.input)?;
            for acc in &mut accumulators {
                acc.add(&output, &row.desired_output);
            }
            if let (Some(mode), Some(matrix)) = (&self.classifier, confusion.as_mut()) {
                let (actual, predicted) = mode.classes(&output, &row.desired_output);
                matrix.increment(actual, predicted)?;
            }
        }

        let class_metrics = confusion.as_ref().map(ClassificationMetrics::from_matrix).unwrap_or_default();
        let average = confusion.as_ref().map(|_| ClassificationMetrics::average(&class_metrics));
        let report = EvaluationReport {
            rows: dataset.len(),
            errors: accumulators.iter().map(|a| (a.metric(), a.total_error())).collect(),
            confusion,
            class_metrics,
            average,
        };
        info!("evaluation over {} rows\n{}", report.rows, report);
        Ok(report)
    }
}

impl EvaluationReport {
    pub fn error(&self, metric: ErrorMetric) -> Option<f64> {
        self.errors.iter().find(|(m, _)| *m == metric).map(|&(_, e)| e)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (metric, value) in &self.errors {
            writeln!(f, "{}: {}", metric.name(), value)?;
        }
        if let Some(matrix) = &self.confusion {
            writeln!(f, "confusion matrix:")?;
            write!(f, "{}", matrix)?;
            for m in &self.class_metrics {
                writeln!(f, "{}", m)?;
            }
        }
        if let Some(avg) = &self.average {
            writeln!(f, "{}", avg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::transfer::TransferFunction;
    use crate::data::dataset::Row;
    use crate::layers::dense::Layer;
    use crate::math::matrix::Matrix;
    use approx::assert_abs_diff_eq;

    /// Identity network whose outputs equal its inputs.
    fn passthrough(width: usize) -> Network {
        let mut weights = Matrix::zeros(width, width);
        for i in 0..width {
            weights[(i, i)] = 1.0;
        }
        let layers = vec![Layer::from_parts(weights, vec![0.0; width])];
        Network::from_layers(TransferFunction::Identity, width, layers).unwrap()
    }

    #[test]
    fn argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(&[0.1, 0.9, 0.9]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[f64::NAN, 0.2, 0.1]), 1);
        assert_eq!(argmax(&[0.3]), 0);
    }

    #[test]
    fn error_metrics_over_rows_and_outputs() {
        let net = passthrough(1);
        let ds = DataSet::from_rows(1, 1, vec![
            Row::new(vec![1.0], vec![0.0]),
            Row::new(vec![0.5], vec![1.0]),
        ]).unwrap();
        assert_abs_diff_eq!(error_evaluate(&net, &ds, ErrorMetric::MeanSquared).unwrap(), (1.0 + 0.25) / 2.0);
        assert_abs_diff_eq!(error_evaluate(&net, &ds, ErrorMetric::MeanAbsolute).unwrap(), (1.0 + 0.5) / 2.0);
    }

    #[test]
    fn binary_threshold_is_inclusive() {
        let net = passthrough(1);
        let ds = DataSet::from_rows(1, 1, vec![
            Row::new(vec![0.5], vec![1.0]),
            Row::new(vec![0.49], vec![0.0]),
            Row::new(vec![0.8], vec![0.0]),
        ]).unwrap();
        let m = classify(&net, &ds, &ClassificationMode::binary(0.5)).unwrap();
        assert_eq!(m.count(1, 1), 1);
        assert_eq!(m.count(0, 0), 1);
        assert_eq!(m.count(0, 1), 1);
    }

    #[test]
    fn classifier_output_width_is_validated() {
        let net = passthrough(2);
        let ds = DataSet::new(2, 2);
        assert!(matches!(
            classify(&net, &ds, &ClassificationMode::binary(0.5)),
            Err(EngineError::Validation { .. })
        ));
        assert!(matches!(
            classify(&net, &ds, &ClassificationMode::multi_class(["a", "b", "c"])),
            Err(EngineError::Validation { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn composite_report_has_all_parts() {
        let net = passthrough(2);
        let ds = DataSet::from_rows(2, 2, vec![
            Row::new(vec![0.9, 0.1], vec![1.0, 0.0]),
            Row::new(vec![0.2, 0.7], vec![0.0, 1.0]),
            Row::new(vec![0.6, 0.4], vec![0.0, 1.0]),
        ]).unwrap();
        let report = Evaluation::new()
            .with_error(ErrorMetric::MeanSquared)
            .with_error(ErrorMetric::MeanSquared)
            .with_classifier(ClassificationMode::multi_class(["x", "y"]))
            .evaluate(&net, &ds)
            .unwrap();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.rows, 3);
        let m = report.confusion.as_ref().unwrap();
        assert_eq!(m.correct(), 2);
        assert_eq!(m.count(1, 0), 1);
        assert_eq!(report.class_metrics.len(), 2);
        assert!(report.to_string().contains("confusion matrix"));
    }
}
