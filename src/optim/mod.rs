pub mod momentum;

pub use momentum::{MomentumSgd, Velocity};
