pub mod builtin;
pub mod dataset;
pub mod normalizer;

pub use dataset::{DataSet, Row, TextFormat};
pub use normalizer::{NormalizeTarget, Normalizer};
