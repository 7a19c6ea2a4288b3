use lumen_nn::data::builtin;
use lumen_nn::{ClassificationMode, ErrorMetric, Evaluation, LearningParams, Network, Trainer, TransferFunction};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dataset = builtin::logical_and();
    let mut network = Network::with_seed(TransferFunction::Sigmoid, &[2, 3, 1], 7)?;

    let params = LearningParams::default()
        .with_learning_rate(0.1)
        .with_momentum(0.7)
        .with_max_error(0.01)
        .with_max_iterations(10_000);

    let outcome = Trainer::momentum_backpropagation(&mut network, params)
        .with_listener(|stats| {
            if stats.iteration % 100 == 0 {
                println!("Sweep {}: error = {:.6}", stats.iteration, stats.total_error);
            }
            Ok(())
        })
        .learn(&dataset)?;
    println!("{:?} after {} sweeps (error {:.6})", outcome.state, outcome.iterations, outcome.total_error);

    for row in &dataset {
        println!("Input: {:?} -> Output: {:.4}", row.input, network.predict(&row.input)?[0]);
    }

    let report = Evaluation::new()
        .with_error(ErrorMetric::MeanSquared)
        .with_classifier(ClassificationMode::binary(0.5))
        .evaluate(&network, &dataset)?;
    println!("{}", report);
    Ok(())
}
