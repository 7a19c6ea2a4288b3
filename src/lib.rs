pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod data;
pub mod loss;
pub mod optim;
pub mod train;
pub mod eval;

// Convenience re-exports
pub use error::{EngineError, Result};
pub use math::matrix::Matrix;
pub use activation::transfer::TransferFunction;
pub use layers::dense::Layer;
pub use network::network::Network;
pub use network::spec::NetworkSpec;
pub use data::dataset::{DataSet, Row, TextFormat};
pub use data::normalizer::{NormalizeTarget, Normalizer};
pub use loss::error_metric::ErrorMetric;
pub use train::learning_rule::{LearningRule, TrainingState};
pub use train::train_config::LearningParams;
pub use train::trainer::{Trainer, TrainingOutcome};
pub use train::epoch_stats::SweepStats;
pub use eval::confusion::ConfusionMatrix;
pub use eval::evaluator::{classify, error_evaluate, ClassificationMode, Evaluation, EvaluationReport};
pub use eval::metrics::{ClassificationMetrics, MetricsSummary};
