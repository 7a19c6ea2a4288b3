use log::{debug, warn};
use serde::{Serialize, Deserialize};

use crate::data::dataset::{DataSet, Row};

/// Dataset-wide column rescaling.
///
/// - `Max`:    divide each column by its largest absolute value
///              (a column of zeros is left as is).
/// - `MaxMin`: map each column onto `[0, 1]` via `(v - min) / (max - min)`;
///              a constant column becomes all zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalizer {
    Max,
    MaxMin,
}

/// Which columns a normalizer touches. One-hot class indicators should be
/// left alone, continuous targets usually are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeTarget {
    Inputs,
    InputsAndOutputs,
}

#[derive(Debug, Clone, Copy)]
struct ColumnStats {
    min: f64,
    max: f64,
    max_abs: f64,
}

impl Normalizer {
    pub fn normalize(&self, dataset: &mut DataSet, target: NormalizeTarget) {
        if dataset.is_empty() {
            return;
        }

        let inputs = column_stats(dataset.rows(), |r| &r.input);
        let outputs = match target {
            NormalizeTarget::Inputs => None,
            NormalizeTarget::InputsAndOutputs => Some(column_stats(dataset.rows(), |r| &r.desired_output)),
        };

        let degenerate = inputs.iter().filter(|s| self.is_degenerate(s)).count();
        if degenerate > 0 {
            warn!("{:?} normalization: {} constant input column(s) mapped to a fixed value", self, degenerate);
        }

        for row in dataset.rows_mut() {
            self.rescale(&mut row.input, &inputs);
            if let Some(stats) = &outputs {
                self.rescale(&mut row.desired_output, stats);
            }
        }
        debug!("{:?} normalization applied to {} rows ({:?})", self, dataset.len(), target);
    }

    fn is_degenerate(&self, stats: &ColumnStats) -> bool {
        match self {
            Normalizer::Max => stats.max_abs == 0.0,
            Normalizer::MaxMin => stats.max == stats.min,
        }
    }

    fn rescale(&self, values: &mut [f64], stats: &[ColumnStats]) {
        for (v, s) in values.iter_mut().zip(stats) {
            *v = match self {
                Normalizer::Max => {
                    let divisor = if s.max_abs == 0.0 { 1.0 } else { s.max_abs };
                    *v / divisor
                }
                Normalizer::MaxMin => {
                    let span = s.max - s.min;
                    if span == 0.0 { 0.0 } else { (*v - s.min) / span }
                }
            };
        }
    }
}

fn column_stats<F>(rows: &[Row], column: F) -> Vec<ColumnStats>
where
    F: Fn(&Row) -> &Vec<f64>,
{
    let width = rows.first().map_or(0, |r| column(r).len());
    let mut stats = vec![
        ColumnStats { min: f64::INFINITY, max: f64::NEG_INFINITY, max_abs: 0.0 };
        width
    ];
    for row in rows {
        for (s, &v) in stats.iter_mut().zip(column(row)) {
            s.min = s.min.min(v);
            s.max = s.max.max(v);
            s.max_abs = s.max_abs.max(v.abs());
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> DataSet {
        DataSet::from_rows(2, 1, vec![
            Row::new(vec![2.0, -8.0], vec![10.0]),
            Row::new(vec![-4.0, 4.0], vec![20.0]),
            Row::new(vec![1.0, 0.0], vec![30.0]),
        ]).unwrap()
    }

    #[test]
    fn max_divides_by_largest_magnitude() {
        let mut ds = sample();
        ds.normalize(Normalizer::Max, NormalizeTarget::Inputs);
        assert_eq!(ds.rows()[0].input, vec![0.5, -1.0]);
        assert_eq!(ds.rows()[1].input, vec![-1.0, 0.5]);
        // outputs untouched
        assert_eq!(ds.rows()[2].desired_output, vec![30.0]);
    }

    #[test]
    fn max_min_maps_onto_unit_interval() {
        let mut ds = sample();
        ds.normalize(Normalizer::MaxMin, NormalizeTarget::InputsAndOutputs);
        assert_abs_diff_eq!(ds.rows()[0].input[0], 1.0);
        assert_abs_diff_eq!(ds.rows()[1].input[0], 0.0);
        assert_abs_diff_eq!(ds.rows()[2].input[0], 5.0 / 6.0);
        assert_abs_diff_eq!(ds.rows()[1].desired_output[0], 0.5);
    }

    #[test]
    fn degenerate_columns_have_defined_results() {
        let mut zeros = DataSet::from_rows(1, 1, vec![
            Row::new(vec![0.0], vec![0.0]),
            Row::new(vec![0.0], vec![1.0]),
        ]).unwrap();
        zeros.normalize(Normalizer::Max, NormalizeTarget::Inputs);
        assert!(zeros.iter().all(|r| r.input[0] == 0.0));

        let mut constant = DataSet::from_rows(1, 1, vec![
            Row::new(vec![3.0], vec![0.0]),
            Row::new(vec![3.0], vec![1.0]),
        ]).unwrap();
        constant.normalize(Normalizer::MaxMin, NormalizeTarget::Inputs);
        assert!(constant.iter().all(|r| r.input[0] == 0.0));
    }
}
