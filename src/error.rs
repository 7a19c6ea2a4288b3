use std::error::Error as StdError;

/// Errors raised by dataset handling, network construction, training and
/// evaluation. All of them are fatal to the operation that produced them.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed dataset line or unrecognised persisted-network header.
    /// `line` is the 1-based physical line number, `0` when not line-based.
    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },

    /// Invalid hyperparameters, split percentages or empty datasets.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Vector length does not match the network architecture.
    #[error("{what} length mismatch: expected {expected}, got {actual}")]
    Validation {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Accumulated training error became NaN or infinite.
    #[error("training diverged at iteration {iteration} (total error {error})")]
    Divergence { iteration: usize, error: f64 },

    /// The sweep listener returned an error and training was aborted.
    #[error("sweep listener aborted training: {0}")]
    Listener(Box<dyn StdError + Send + Sync>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        EngineError::Format { line, message: message.into() }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        EngineError::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
