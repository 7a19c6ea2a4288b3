pub mod epoch_stats;
pub mod learning_rule;
pub mod loop_fn;
pub mod train_config;
pub mod trainer;

pub use epoch_stats::SweepStats;
pub use learning_rule::{LearningRule, TrainingState};
pub use train_config::LearningParams;
pub use trainer::{ListenerError, SweepListener, Trainer, TrainingOutcome};
