use serde::Serialize;
use tracing::debug;

use crate::error::{DatasetError, Result};

/// Column-major table of samples.
///
/// Every column holds exactly `row_count` values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    column_count: usize,
    row_count: usize,
    columns: Vec<Vec<f64>>,
}

impl Dataset {
    /// Slice a flat column-major sample sequence into columns.
    ///
    /// `output[r][c] == samples[c * row_count + r]`. Any length other than
    /// `column_count * row_count` is rejected; nothing is truncated or
    /// padded.
    pub fn assemble(column_count: usize, row_count: usize, samples: Vec<f64>) -> Result<Self> {
        let expected = column_count as u128 * row_count as u128;
        if samples.len() as u128 != expected {
            return Err(DatasetError::ShapeMismatch {
                columns: column_count,
                rows: row_count,
                expected,
                actual: samples.len(),
            });
        }

        let columns = if row_count == 0 {
            vec![Vec::new(); column_count]
        } else {
            samples
                .chunks_exact(row_count)
                .map(<[f64]>::to_vec)
                .collect()
        };

        debug!(column_count, row_count, "assembled dataset");
        Ok(Self {
            column_count,
            row_count,
            columns,
        })
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.column_count == 0 || self.row_count == 0
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn column(&self, column: usize) -> Option<&[f64]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    /// Value at `row` of `column`.
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.columns.get(column)?.get(row).copied()
    }

    /// Rows in order, each with one value per column.
    pub fn rows(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        (0..self.row_count).map(move |row| self.columns.iter().map(|col| col[row]).collect())
    }
}

/// An assembled dataset with one label per column, ready to present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotData {
    labels: Vec<String>,
    dataset: Dataset,
}

impl PlotData {
    pub fn new(dataset: Dataset, labels: Vec<String>) -> Result<Self> {
        if labels.len() != dataset.column_count() {
            return Err(DatasetError::LabelCount {
                columns: dataset.column_count(),
                actual: labels.len(),
            });
        }
        Ok(Self { labels, dataset })
    }

    /// Assemble samples and attach labels in one step.
    pub fn assemble(
        column_count: usize,
        row_count: usize,
        samples: Vec<f64>,
        labels: Vec<String>,
    ) -> Result<Self> {
        Self::new(Dataset::assemble(column_count, row_count, samples)?, labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// `(label, column)` pairs in column order.
    pub fn series(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.dataset.columns().iter().map(Vec::as_slice))
    }
}
