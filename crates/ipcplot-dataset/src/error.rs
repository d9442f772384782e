/// Errors raised while assembling a dataset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    /// The sample count is not `columns * rows`.
    #[error("shape mismatch: {columns} columns x {rows} rows needs {expected} samples, got {actual}")]
    ShapeMismatch {
        columns: usize,
        rows: usize,
        expected: u128,
        actual: usize,
    },

    /// The label count is not one per column.
    #[error("label count mismatch: {columns} columns, got {actual} labels")]
    LabelCount { columns: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, DatasetError>;
