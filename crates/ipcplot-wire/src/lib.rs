//! Fixed-layout binary records for the ipcplot channel.
//!
//! Every record mirrors a C struct on the host side, little-endian with the
//! host's native alignment:
//! - [`StatusRecord`]: `u32` code + three `char[1024]` text fields
//! - [`HeaderRecord`]: `u32` columns, `u32` rows, two ignored pointers
//! - [`SampleRecord`]: one `f64`
//! - [`LabelRecord`]: one `char[128]`
//!
//! [`RecordReader`] and [`RecordWriter`] drive whole records over any
//! `Read`/`Write` stream. A short read is always an error, never a partial
//! record.

pub mod error;
pub mod layout;
pub mod reader;
pub mod record;
pub mod status;
pub mod text;
pub mod writer;

pub use error::{Result, WireError};
pub use layout::{PointerWidth, WireLayout, DEFAULT_SAMPLE_CAPACITY};
pub use reader::RecordReader;
pub use record::{
    HeaderRecord, LabelRecord, SampleRecord, StatusRecord, LABEL_CAPACITY, STATUS_TEXT_CAPACITY,
};
pub use status::{ParseStatusCodeError, StatusCode};
pub use writer::RecordWriter;
