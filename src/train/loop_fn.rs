use crate::data::dataset::DataSet;
use crate::error::Result;
use crate::loss::error_metric::{ErrorAccumulator, ErrorMetric};
use crate::loss::mse::MseLoss;
use crate::network::network::Network;
use crate::optim::momentum::{MomentumSgd, Velocity};

// ---------------------------------------------------------------------------
// Sweeps
// ---------------------------------------------------------------------------

/// One pass of online backpropagation over every row.
///
/// For each row the local errors of all layers are computed from the
/// pre-update weights, output layer first, and then every layer is updated.
pub fn backprop_sweep(
    network: &mut Network,
    dataset: &DataSet,
    optimizer: &MomentumSgd,
    velocity: &mut Velocity,
) -> Result<()> {
    let transfer = network.transfer();
    let n_layers = network.layers().len();
    let mut local_errors: Vec<Vec<f64>> = vec![Vec::new(); n_layers];

    for row in dataset {
        network.set_input(&row.input)?;
        network.calculate();

        // Backward pass: error in activation space, then δ = error ⊙ f'(net).
        let mut upstream = MseLoss::error(network.output(), &row.desired_output);
        for i in (0..n_layers).rev() {
            let layer = &network.layers()[i];
            let deltas = layer.local_errors(&upstream, transfer);
            if i > 0 {
                upstream = layer.back_propagate(&deltas);
            }
            local_errors[i] = deltas;
        }

        for (i, deltas) in local_errors.iter().enumerate() {
            let (layer, inputs) = network.layer_and_inputs_mut(i);
            optimizer.step(layer, deltas, inputs, &mut velocity.weights[i], &mut velocity.biases[i]);
        }
    }
    Ok(())
}

/// One pass of the LMS (Widrow-Hoff) rule over every row. The network is a
/// single linear layer, so the raw output error is the update signal.
pub fn lms_sweep(
    network: &mut Network,
    dataset: &DataSet,
    optimizer: &MomentumSgd,
    velocity: &mut Velocity,
) -> Result<()> {
    for row in dataset {
        network.set_input(&row.input)?;
        network.calculate();
        let error = MseLoss::error(network.output(), &row.desired_output);

        let (layer, inputs) = network.layer_and_inputs_mut(0);
        optimizer.step(layer, &error, inputs, &mut velocity.weights[0], &mut velocity.biases[0]);
    }
    Ok(())
}

/// Mean squared error of the current weights over the whole dataset,
/// without touching cached activations.
pub fn sweep_error(network: &Network, dataset: &DataSet) -> Result<f64> {
    let mut acc = ErrorAccumulator::new(ErrorMetric::MeanSquared);
    for row in dataset {
        let output = network.predict(&row.input)?;
        acc.add(&output, &row.desired_output);
    }
    Ok(acc.total_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::transfer::TransferFunction;
    use crate::data::dataset::Row;
    use crate::layers::dense::Layer;
    use crate::math::matrix::Matrix;
    use approx::assert_abs_diff_eq;

    #[test]
    fn lms_single_row_update() {
        let layers = vec![Layer::from_parts(Matrix::from_data(vec![vec![0.0]]), vec![0.0])];
        let mut net = Network::from_layers(TransferFunction::Identity, 1, layers).unwrap();
        let ds = DataSet::from_rows(1, 1, vec![Row::new(vec![2.0], vec![4.0])]).unwrap();
        let mut velocity = Velocity::zeros_like(&net);

        lms_sweep(&mut net, &ds, &MomentumSgd::new(0.1, 0.0), &mut velocity).unwrap();
        // error 4, update = 0.1 * 4 * 2 for the weight and 0.1 * 4 for the bias
        assert_abs_diff_eq!(net.weight(1, 0, 0), 0.8);
        assert_abs_diff_eq!(net.bias(1, 0), 0.4);
    }

    #[test]
    fn backprop_hidden_update_uses_pre_update_weights() {
        // 1 -> 1 -> 1 identity network, every parameter known.
        let layers = vec![
            Layer::from_parts(Matrix::from_data(vec![vec![0.5]]), vec![0.0]),
            Layer::from_parts(Matrix::from_data(vec![vec![2.0]]), vec![0.0]),
        ];
        let mut net = Network::from_layers(TransferFunction::Identity, 1, layers).unwrap();
        let ds = DataSet::from_rows(1, 1, vec![Row::new(vec![1.0], vec![2.0])]).unwrap();
        let mut velocity = Velocity::zeros_like(&net);

        backprop_sweep(&mut net, &ds, &MomentumSgd::new(0.1, 0.0), &mut velocity).unwrap();
        // hidden = 0.5, output = 1.0, error = 1.0
        // output weight += 0.1 * 1.0 * 0.5; hidden δ = 2.0 * 1.0 (old weight)
        assert_abs_diff_eq!(net.weight(2, 0, 0), 2.05);
        assert_abs_diff_eq!(net.weight(1, 0, 0), 0.7);
        assert_abs_diff_eq!(net.bias(1, 0), 0.2);
        assert_abs_diff_eq!(net.bias(2, 0), 0.1);
    }

    #[test]
    fn sweep_error_is_mean_squared() {
        let layers = vec![Layer::from_parts(Matrix::from_data(vec![vec![1.0]]), vec![0.0])];
        let net = Network::from_layers(TransferFunction::Identity, 1, layers).unwrap();
        let ds = DataSet::from_rows(1, 1, vec![
            Row::new(vec![1.0], vec![2.0]),
            Row::new(vec![3.0], vec![0.0]),
        ]).unwrap();
        assert_abs_diff_eq!(sweep_error(&net, &ds).unwrap(), (1.0 + 9.0) / 2.0);
    }
}
