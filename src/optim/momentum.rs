use crate::{math::matrix::Matrix, layers::dense::Layer, network::network::Network};

/// Previous-update buffers, one per weight and bias, shaped like the network.
#[derive(Debug, Clone)]
pub struct Velocity {
    pub weights: Vec<Matrix>,
    pub biases: Vec<Vec<f64>>,
}

impl Velocity {
    pub fn zeros_like(network: &Network) -> Velocity {
        Velocity {
            weights: network.layers().iter()
                .map(|l| Matrix::zeros(l.weights.rows, l.weights.cols))
                .collect(),
            biases: network.layers().iter().map(|l| vec![0.0; l.size]).collect(),
        }
    }

    pub fn reset(&mut self) {
        self.weights.iter_mut().for_each(|m| m.fill(0.0));
        self.biases.iter_mut().for_each(|b| b.iter_mut().for_each(|x| *x = 0.0));
    }
}

/// Gradient-descent step with optional momentum:
///
/// ```text
/// update = learning_rate * local_error * input + momentum * previous_update
/// weight += update
/// ```
///
/// Biases follow the same rule with a constant input of 1.
pub struct MomentumSgd {
    pub learning_rate: f64,
    pub momentum: f64,
}

impl MomentumSgd {
    pub fn new(learning_rate: f64, momentum: f64) -> MomentumSgd {
        MomentumSgd { learning_rate, momentum }
    }

    /// Applies one update to `layer` given its local errors and the
    /// activations that fed it; `prev_w`/`prev_b` are read then overwritten.
    pub fn step(
        &self,
        layer: &mut Layer,
        local_errors: &[f64],
        inputs: &[f64],
        prev_w: &mut Matrix,
        prev_b: &mut [f64],
    ) {
        for (j, &delta) in local_errors.iter().enumerate() {
            let scaled = self.learning_rate * delta;
            let weights = layer.weights.row_mut(j);
            let previous = prev_w.row_mut(j);
            for ((w, prev), &x) in weights.iter_mut().zip(previous.iter_mut()).zip(inputs) {
                let update = scaled * x + self.momentum * *prev;
                *w += update;
                *prev = update;
            }

            let update = scaled + self.momentum * prev_b[j];
            layer.biases[j] += update;
            prev_b[j] = update;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn momentum_adds_fraction_of_previous_update() {
        let mut layer = Layer::from_parts(Matrix::from_data(vec![vec![0.0, 0.0]]), vec![0.0]);
        let mut prev_w = Matrix::zeros(1, 2);
        let mut prev_b = vec![0.0];
        let opt = MomentumSgd::new(0.5, 0.5);

        opt.step(&mut layer, &[1.0], &[1.0, 2.0], &mut prev_w, &mut prev_b);
        assert_eq!(layer.weights.row(0), &[0.5, 1.0]);
        assert_eq!(layer.biases, vec![0.5]);

        opt.step(&mut layer, &[1.0], &[1.0, 2.0], &mut prev_w, &mut prev_b);
        // second update = 0.5 * x + 0.5 * first update
        assert_abs_diff_eq!(layer.weights[(0, 0)], 0.5 + 0.75);
        assert_abs_diff_eq!(layer.weights[(0, 1)], 1.0 + 1.5);
        assert_abs_diff_eq!(layer.biases[0], 0.5 + 0.75);
        assert_abs_diff_eq!(prev_b[0], 0.75);
    }

    #[test]
    fn zero_momentum_is_plain_gradient_descent() {
        let mut layer = Layer::from_parts(Matrix::from_data(vec![vec![1.0]]), vec![0.0]);
        let mut prev_w = Matrix::from_data(vec![vec![10.0]]);
        let mut prev_b = vec![10.0];
        MomentumSgd::new(0.1, 0.0).step(&mut layer, &[-2.0], &[3.0], &mut prev_w, &mut prev_b);
        assert_abs_diff_eq!(layer.weights[(0, 0)], 1.0 - 0.6);
        assert_abs_diff_eq!(layer.biases[0], -0.2);
    }
}
