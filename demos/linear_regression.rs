use lumen_nn::data::builtin;
use lumen_nn::{error_evaluate, ErrorMetric, LearningParams, Network, Trainer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dataset = builtin::linear_with_noise(40, 2.0);
    let (train, test) = dataset.split(75, 25)?;

    let mut network = Network::adaline(1)?;
    let params = LearningParams::default()
        .with_learning_rate(0.05)
        .with_max_error(1e-4)
        .with_max_iterations(2000);

    let outcome = Trainer::lms(&mut network, params).learn(&train)?;
    println!("{:?} after {} sweeps", outcome.state, outcome.iterations);
    println!("learned y = {:.4} * x + {:.4}", network.weight(1, 0, 0), network.bias(1, 0));

    println!("test MSE = {:.6}", error_evaluate(&network, &test, ErrorMetric::MeanSquared)?);
    println!("test MAE = {:.6}", error_evaluate(&network, &test, ErrorMetric::MeanAbsolute)?);
    Ok(())
}
