pub mod error_metric;
pub mod mae;
pub mod mse;

pub use error_metric::{ErrorAccumulator, ErrorMetric};
pub use mae::MaeLoss;
pub use mse::MseLoss;
