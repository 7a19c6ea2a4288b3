use lumen_nn::data::builtin;
use lumen_nn::{
    ClassificationMode, ErrorMetric, Evaluation, LearningParams, Network, NetworkSpec, NormalizeTarget,
    Normalizer, Trainer, TransferFunction,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut dataset = builtin::two_blobs(200);
    dataset.normalize(Normalizer::MaxMin, NormalizeTarget::Inputs);
    dataset.shuffle_seeded(42);
    let (train, test) = dataset.split(70, 30)?;

    let labels = dataset.class_labels().map(<[String]>::to_vec).unwrap_or_default();
    let spec = NetworkSpec::new("blobs", TransferFunction::Sigmoid, vec![2, 4, 2])
        .with_class_labels(labels.clone());
    let mut network = spec.build(Some(42))?;

    let params = LearningParams::default()
        .with_learning_rate(0.2)
        .with_momentum(0.5)
        .with_max_error(0.02)
        .with_max_iterations(3000);
    let outcome = Trainer::momentum_backpropagation(&mut network, params).learn(&train)?;
    println!("{:?} after {} sweeps (error {:.6})", outcome.state, outcome.iterations, outcome.total_error);

    let path = std::env::temp_dir().join("lumen_blobs.lnn");
    network.save(&path)?;
    let restored = Network::load(&path)?;

    let report = Evaluation::new()
        .with_error(ErrorMetric::MeanSquared)
        .with_error(ErrorMetric::MeanAbsolute)
        .with_classifier(ClassificationMode::multi_class(labels))
        .evaluate(&restored, &test)?;
    println!("{}", report);
    Ok(())
}
