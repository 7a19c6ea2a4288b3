pub mod network;
pub mod persist;
pub mod spec;

pub use network::Network;
pub use persist::{FORMAT_VERSION, MAGIC};
pub use spec::NetworkSpec;
