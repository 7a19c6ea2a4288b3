use std::fmt;

use serde::{Serialize, Deserialize};

use crate::error::{EngineError, Result};

/// Class-by-class count of classifications.
///
/// Rows are the actual class, columns the predicted class:
/// `count(actual, predicted)`. Class indices follow the label order given at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    counts: Vec<Vec<usize>>,
    total: usize,
}

impl ConfusionMatrix {
    pub fn new(labels: Vec<String>) -> ConfusionMatrix {
        let n = labels.len();
        ConfusionMatrix {
            labels,
            counts: vec![vec![0; n]; n],
            total: 0,
        }
    }

    /// Builds a matrix from `(actual, predicted)` class index pairs.
    pub fn from_pairs<I>(labels: Vec<String>, pairs: I) -> Result<ConfusionMatrix>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut matrix = ConfusionMatrix::new(labels);
        for (actual, predicted) in pairs {
            matrix.increment(actual, predicted)?;
        }
        Ok(matrix)
    }

    pub fn increment(&mut self, actual: usize, predicted: usize) -> Result<()> {
        let n = self.class_count();
        for idx in [actual, predicted] {
            if idx >= n {
                return Err(EngineError::Validation {
                    what: "class index bound",
                    expected: n,
                    actual: idx,
                });
            }
        }
        self.counts[actual][predicted] += 1;
        self.total += 1;
        Ok(())
    }

    pub fn class_count(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn count(&self, actual: usize, predicted: usize) -> usize {
        self.counts[actual][predicted]
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of classifications on the diagonal.
    pub fn correct(&self) -> usize {
        (0..self.class_count()).map(|c| self.counts[c][c]).sum()
    }

    pub fn true_positive(&self, class: usize) -> usize {
        self.counts[class][class]
    }

    /// Predicted as `class` while actually another class (column sum minus diagonal).
    pub fn false_positive(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum::<usize>() - self.true_positive(class)
    }

    /// Actually `class` but predicted as another (row sum minus diagonal).
    pub fn false_negative(&self, class: usize) -> usize {
        self.counts[class].iter().sum::<usize>() - self.true_positive(class)
    }

    pub fn true_negative(&self, class: usize) -> usize {
        self.total - self.true_positive(class) - self.false_positive(class) - self.false_negative(class)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let corner = "actual \\ predicted";
        let first = self.labels.iter().map(|l| l.len()).chain([corner.len()]).max().unwrap_or(0);
        let width = self.labels.iter()
            .map(|l| l.len())
            .chain(self.counts.iter().flatten().map(|c| c.to_string().len()))
            .max()
            .unwrap_or(1);

        write!(f, "{:<first$}", corner, first = first)?;
        for label in &self.labels {
            write!(f, "  {:>width$}", label, width = width)?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{:<first$}", label, first = first)?;
            for count in row {
                write!(f, "  {:>width$}", count, width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["cat".into(), "dog".into(), "owl".into()]
    }

    #[test]
    fn derived_counts_follow_row_actual_column_predicted() {
        // actual cat: 3 cat, 1 dog; actual dog: 2 dog, 1 owl; actual owl: 1 cat, 2 owl
        let pairs = [(0, 0), (0, 0), (0, 0), (0, 1), (1, 1), (1, 1), (1, 2), (2, 0), (2, 2), (2, 2)];
        let m = ConfusionMatrix::from_pairs(labels(), pairs).unwrap();
        assert_eq!(m.total(), 10);
        assert_eq!(m.correct(), 7);
        assert_eq!(m.count(0, 1), 1);
        assert_eq!(m.true_positive(0), 3);
        assert_eq!(m.false_positive(0), 1);
        assert_eq!(m.false_negative(0), 1);
        assert_eq!(m.true_negative(0), 5);
        assert_eq!(m.false_positive(2), 1);
        assert_eq!(m.false_negative(2), 1);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut m = ConfusionMatrix::new(labels());
        assert!(m.increment(3, 0).is_err());
        assert!(m.increment(0, 7).is_err());
        assert_eq!(m.total(), 0);
    }

    #[test]
    fn display_lists_every_label() {
        let m = ConfusionMatrix::from_pairs(labels(), [(0, 1), (2, 2)]).unwrap();
        let text = m.to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().nth(1).unwrap().starts_with("cat"));
        assert!(text.contains("owl"));
    }
}
