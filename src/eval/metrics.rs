use std::fmt;

use serde::{Serialize, Deserialize};

use crate::eval::confusion::ConfusionMatrix;

/// One-vs-rest quality metrics for a single class.
///
/// A metric whose denominator is zero is reported as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub class_label: String,
    pub true_positive: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_negative: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
}

/// Unweighted mean of each metric across classes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub class_count: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
}

impl ClassificationMetrics {
    pub fn for_class(matrix: &ConfusionMatrix, class: usize) -> ClassificationMetrics {
        let tp = matrix.true_positive(class);
        let fp = matrix.false_positive(class);
        let fn_ = matrix.false_negative(class);
        let tn = matrix.true_negative(class);

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        ClassificationMetrics {
            class_label: matrix.labels()[class].clone(),
            true_positive: tp,
            false_positive: fp,
            false_negative: fn_,
            true_negative: tn,
            precision,
            recall,
            f1,
            accuracy: ratio(tp + tn, matrix.total()),
        }
    }

    /// Metrics for every class, in label order.
    pub fn from_matrix(matrix: &ConfusionMatrix) -> Vec<ClassificationMetrics> {
        (0..matrix.class_count())
            .map(|c| ClassificationMetrics::for_class(matrix, c))
            .collect()
    }

    pub fn average(metrics: &[ClassificationMetrics]) -> MetricsSummary {
        if metrics.is_empty() {
            return MetricsSummary::default();
        }
        let n = metrics.len() as f64;
        let mean = |f: fn(&ClassificationMetrics) -> f64| metrics.iter().map(f).sum::<f64>() / n;
        MetricsSummary {
            class_count: metrics.len(),
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1: mean(|m| m.f1),
            accuracy: mean(|m| m.accuracy),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}

impl fmt::Display for ClassificationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "class {}: precision {:.4}, recall {:.4}, F1 {:.4}, accuracy {:.4} (TP {}, FP {}, FN {}, TN {})",
            self.class_label, self.precision, self.recall, self.f1, self.accuracy,
            self.true_positive, self.false_positive, self.false_negative, self.true_negative
        )
    }
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "average over {} classes: precision {:.4}, recall {:.4}, F1 {:.4}, accuracy {:.4}",
            self.class_count, self.precision, self.recall, self.f1, self.accuracy
        )
    }
}
