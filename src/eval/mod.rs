pub mod confusion;
pub mod evaluator;
pub mod metrics;

pub use confusion::ConfusionMatrix;
pub use evaluator::{argmax, classify, error_evaluate, ClassificationMode, Evaluation, EvaluationReport};
pub use metrics::{ClassificationMetrics, MetricsSummary};
