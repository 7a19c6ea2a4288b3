//! Small deterministic datasets for demos and tests.

use crate::data::dataset::{DataSet, Row};

/// Logical AND: 4 samples, 2 inputs, 1 output.
pub fn logical_and() -> DataSet {
    DataSet::from_generated(2, 1, vec![
        Row::new(vec![0.0, 0.0], vec![0.0]),
        Row::new(vec![0.0, 1.0], vec![0.0]),
        Row::new(vec![1.0, 0.0], vec![0.0]),
        Row::new(vec![1.0, 1.0], vec![1.0]),
    ])
}

/// Logical XOR: 4 samples, 2 inputs, 1 output.
pub fn logical_xor() -> DataSet {
    DataSet::from_generated(2, 1, vec![
        Row::new(vec![0.0, 0.0], vec![0.0]),
        Row::new(vec![0.0, 1.0], vec![1.0]),
        Row::new(vec![1.0, 0.0], vec![1.0]),
        Row::new(vec![1.0, 1.0], vec![0.0]),
    ])
}

/// `n` samples of `y = slope * x + ε` with `x` evenly spaced over `[0, 1)`
/// and a small deterministic `ε` in `[-0.05, 0.05]`.
pub fn linear_with_noise(n: usize, slope: f64) -> DataSet {
    let rows = (0..n)
        .map(|i| {
            let x = i as f64 / n as f64;
            let noise = 0.05 * (i as f64 * 7.3).sin();
            Row::new(vec![x], vec![slope * x + noise])
        })
        .collect();
    DataSet::from_generated(1, 1, rows)
}

/// `n` samples of 2D "two blobs" data with one-hot outputs of length 2.
/// Class 0 is centred at (0.3, 0.3), class 1 at (0.7, 0.7).
pub fn two_blobs(n: usize) -> DataSet {
    let centers = [(0.3f64, 0.3f64), (0.7f64, 0.7f64)];
    let rows = (0..n)
        .map(|i| {
            let class = i % 2;
            let (cx, cy) = centers[class];
            // Deterministic "pseudo-random" spread using sin/cos of index.
            let angle = i as f64 * 2.399;
            let r = 0.12 * (i as f64 * 0.31).sin().abs();
            let x = (cx + r * angle.cos()).clamp(0.0, 1.0);
            let y = (cy + r * angle.sin()).clamp(0.0, 1.0);
            let mut one_hot = vec![0.0, 0.0];
            one_hot[class] = 1.0;
            Row::new(vec![x, y], one_hot)
        })
        .collect();
    DataSet::from_generated(2, 2, rows).with_class_labels(vec!["low".into(), "high".into()])
}
