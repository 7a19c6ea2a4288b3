//! Labeled example rows and their delimited-text loader.
//!
//! Supported text format:
//! - one record per line, fields separated by a single delimiter character
//! - the first `input_size` fields are inputs, the next `output_size` fields
//!   are desired outputs, all parsed as `f64`
//! - an optional header line, skipped (and kept as column names) when
//!   `TextFormat::has_header` is set
//! - blank lines are ignored

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::data::normalizer::{NormalizeTarget, Normalizer};
use crate::error::{EngineError, Result};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One training example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub input: Vec<f64>,
    pub desired_output: Vec<f64>,
}

impl Row {
    pub fn new(input: Vec<f64>, desired_output: Vec<f64>) -> Row {
        Row { input, desired_output }
    }
}

/// Layout of a delimited-text dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFormat {
    pub delimiter: char,
    pub has_header: bool,
}

impl TextFormat {
    pub fn delimited(delimiter: char) -> Self {
        TextFormat { delimiter, has_header: false }
    }

    pub fn with_header(mut self) -> Self {
        self.has_header = true;
        self
    }
}

impl Default for TextFormat {
    fn default() -> Self {
        TextFormat::delimited(',')
    }
}

/// Ordered rows with fixed input/output widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    input_size: usize,
    output_size: usize,
    rows: Vec<Row>,
    #[serde(default)]
    column_names: Option<Vec<String>>,
    #[serde(default)]
    class_labels: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Construction and loading
// ---------------------------------------------------------------------------

impl DataSet {
    pub fn new(input_size: usize, output_size: usize) -> DataSet {
        DataSet {
            input_size,
            output_size,
            rows: Vec::new(),
            column_names: None,
            class_labels: None,
        }
    }

    pub fn from_rows(input_size: usize, output_size: usize, rows: Vec<Row>) -> Result<DataSet> {
        let mut dataset = DataSet::new(input_size, output_size);
        for row in rows {
            dataset.add_row(row)?;
        }
        Ok(dataset)
    }

    /// Wraps rows whose widths are guaranteed by the caller, as the built-in
    /// generators do.
    pub(crate) fn from_generated(input_size: usize, output_size: usize, rows: Vec<Row>) -> DataSet {
        debug_assert!(rows.iter().all(|r| r.input.len() == input_size && r.desired_output.len() == output_size));
        DataSet { rows, ..DataSet::new(input_size, output_size) }
    }

    pub fn add_row(&mut self, row: Row) -> Result<()> {
        if row.input.len() != self.input_size {
            return Err(EngineError::Validation {
                what: "row input",
                expected: self.input_size,
                actual: row.input.len(),
            });
        }
        if row.desired_output.len() != self.output_size {
            return Err(EngineError::Validation {
                what: "row desired output",
                expected: self.output_size,
                actual: row.desired_output.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Parses delimited text from any buffered reader.
    pub fn load<R: BufRead>(
        source: R,
        input_size: usize,
        output_size: usize,
        format: TextFormat,
    ) -> Result<DataSet> {
        if input_size == 0 {
            return Err(EngineError::config("input size must be at least 1"));
        }
        let width = input_size + output_size;
        let mut dataset = DataSet::new(input_size, output_size);

        for (idx, line) in source.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;

            if idx == 0 && format.has_header {
                let names = line.split(format.delimiter).map(|s| s.trim().to_owned()).collect();
                dataset.column_names = Some(names);
                continue;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(format.delimiter).collect();
            if fields.len() != width {
                return Err(EngineError::format(line_no, format!(
                    "expected {} fields ({} inputs + {} outputs), got {}",
                    width, input_size, output_size, fields.len()
                )));
            }

            let values = parse_floats(&fields, line_no)?;
            let (input, output) = values.split_at(input_size);
            dataset.rows.push(Row::new(input.to_vec(), output.to_vec()));
        }

        info!(
            "loaded dataset: {} rows, {} inputs, {} outputs",
            dataset.len(), input_size, output_size
        );
        Ok(dataset)
    }

    pub fn parse(text: &str, input_size: usize, output_size: usize, format: TextFormat) -> Result<DataSet> {
        DataSet::load(text.as_bytes(), input_size, output_size, format)
    }

    pub fn load_path(
        path: impl AsRef<Path>,
        input_size: usize,
        output_size: usize,
        format: TextFormat,
    ) -> Result<DataSet> {
        let file = File::open(path.as_ref())?;
        DataSet::load(BufReader::new(file), input_size, output_size, format)
    }
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl DataSet {
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn column_names(&self) -> Option<&[String]> {
        self.column_names.as_deref()
    }

    pub fn class_labels(&self) -> Option<&[String]> {
        self.class_labels.as_deref()
    }

    pub fn with_class_labels(mut self, labels: Vec<String>) -> Self {
        self.class_labels = Some(labels);
        self
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ---------------------------------------------------------------------------
// Transformations
// ---------------------------------------------------------------------------

impl DataSet {
    /// Rescales columns in place using dataset-wide statistics. Normalize
    /// before `split` so both partitions share one scaling.
    pub fn normalize(&mut self, normalizer: Normalizer, target: NormalizeTarget) {
        normalizer.normalize(self, target);
    }

    /// Uniformly random permutation of row order.
    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    pub fn shuffle_seeded(&mut self, seed: u64) {
        self.shuffle_with(&mut StdRng::seed_from_u64(seed));
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.rows.shuffle(rng);
    }

    /// Partitions rows by percentage. The first partition receives
    /// `floor(len * pct_a / 100)` rows and the second the rest, both in
    /// source order. The source is left untouched.
    pub fn split(&self, pct_a: u32, pct_b: u32) -> Result<(DataSet, DataSet)> {
        if pct_a.checked_add(pct_b) != Some(100) {
            return Err(EngineError::config(format!(
                "split percentages must sum to 100, got {} + {}",
                pct_a, pct_b
            )));
        }
        if self.is_empty() {
            return Err(EngineError::config("cannot split an empty dataset"));
        }

        let cut = self.len() * pct_a as usize / 100;
        let (head, tail) = self.rows.split_at(cut);
        if head.is_empty() || tail.is_empty() {
            warn!("split {}/{} of {} rows leaves an empty partition", pct_a, pct_b, self.len());
        }
        Ok((self.partition(head.to_vec()), self.partition(tail.to_vec())))
    }

    fn partition(&self, rows: Vec<Row>) -> DataSet {
        DataSet {
            input_size: self.input_size,
            output_size: self.output_size,
            rows,
            column_names: self.column_names.clone(),
            class_labels: self.class_labels.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Parses fields as `f64`, returning an error with line info on failure.
fn parse_floats(fields: &[&str], line_no: usize) -> Result<Vec<f64>> {
    fields.iter()
        .map(|f| {
            f.trim().parse::<f64>().map_err(|_| {
                EngineError::format(line_no, format!("'{}' is not a valid number", f.trim()))
            })
        })
        .collect()
}
