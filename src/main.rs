// This binary crate is intentionally minimal.
// All training and evaluation logic lives in the library (src/lib.rs and its modules).
// Run the demos with:
//   cargo run --example logical_and
//   cargo run --example linear_regression
//   cargo run --example blobs_classification
fn main() {
    env_logger::init();
    log::info!("lumen-nn {}", env!("CARGO_PKG_VERSION"));
    println!("lumen-nn: feed-forward network training and evaluation in Rust.");
    println!("Run `cargo run --example logical_and` to see the momentum backpropagation demo.");
}
