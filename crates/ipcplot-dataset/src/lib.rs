//! Column-major dataset assembly for decoded channel transfers.
//!
//! The host sends samples column by column: `[0, rows)` is column 0,
//! `[rows, 2 * rows)` is column 1, and so on. [`Dataset::assemble`] slices
//! that flat sequence into columns and refuses any input whose length is
//! not exactly `columns * rows`.

pub mod dataset;
pub mod error;
pub mod sink;

pub use dataset::{Dataset, PlotData};
pub use error::{DatasetError, Result};
pub use sink::PresentationSink;
