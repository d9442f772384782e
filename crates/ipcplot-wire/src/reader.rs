use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};
use tracing::debug;

use crate::error::{Result, WireError};
use crate::layout::WireLayout;
use crate::record::{HeaderRecord, LabelRecord, SampleRecord, StatusRecord};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 64 * 1024;
/// Upper bound on records reserved up front. Declared counts come from the
/// peer; anything beyond this grows as records actually arrive.
const MAX_PREALLOCATED_RECORDS: usize = 64 * 1024;

/// Reads whole records from any `Read` stream.
///
/// Handles partial reads internally. Records may span read calls and one
/// read may carry several records; the stream ending inside a record, or
/// before a declared count is reached, is an error.
pub struct RecordReader<T> {
    inner: T,
    buf: BytesMut,
    layout: WireLayout,
}

impl<T: Read> RecordReader<T> {
    /// Create a record reader for the default host layout.
    pub fn new(inner: T) -> Self {
        Self::with_layout(inner, WireLayout::default())
    }

    pub fn with_layout(inner: T, layout: WireLayout) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            layout,
        }
    }

    /// Buffer at least `need` bytes unless the stream ends first.
    ///
    /// Returns the number of bytes buffered.
    fn fill(&mut self, need: usize) -> Result<usize> {
        while self.buf.len() < need {
            let start = self.buf.len();
            self.buf.resize(start + READ_CHUNK_SIZE, 0);
            let read = self.inner.read(&mut self.buf[start..]);
            self.buf.truncate(start + read.as_ref().map_or(0, |n| *n));

            match read {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(WireError::Io(err)),
            }
        }
        Ok(self.buf.len())
    }

    fn take(&mut self, record: &'static str, size: usize) -> Result<BytesMut> {
        let available = self.fill(size)?;
        if available < size {
            return Err(WireError::ShortRecord {
                record,
                expected: size,
                received: available,
            });
        }
        Ok(self.buf.split_to(size))
    }

    /// Read the header that opens a data cycle.
    pub fn read_header(&mut self) -> Result<HeaderRecord> {
        let raw = self.take("header", self.layout.header_size())?;
        let header = HeaderRecord::decode(&raw, &self.layout)?;
        debug!(
            columns = header.column_count,
            rows = header.row_count,
            "decoded header"
        );
        Ok(header)
    }

    /// Read the sample block for `header`.
    ///
    /// Exactly `columns * rows` samples are returned. When the layout pads
    /// the block, the padding slots are drained and dropped.
    pub fn read_samples(&mut self, header: &HeaderRecord) -> Result<Vec<f64>> {
        let count = header.sample_count()?;
        let slots = self.layout.sample_block_len(count)?;
        let mut samples = Vec::with_capacity(count.min(MAX_PREALLOCATED_RECORDS));

        for slot in 0..slots {
            if self.fill(SampleRecord::WIRE_SIZE)? < SampleRecord::WIRE_SIZE {
                return Err(WireError::MissingRecords {
                    record: "sample",
                    expected: slots,
                    received: slot,
                });
            }
            if slot < count {
                samples.push(SampleRecord::decode(&self.buf[..SampleRecord::WIRE_SIZE])?.value);
            }
            self.buf.advance(SampleRecord::WIRE_SIZE);
        }

        debug!(samples = samples.len(), slots, "decoded sample block");
        Ok(samples)
    }

    /// Read one label per declared column.
    pub fn read_labels(&mut self, header: &HeaderRecord) -> Result<Vec<String>> {
        let count = header.label_count();
        let mut labels = Vec::with_capacity(count.min(MAX_PREALLOCATED_RECORDS));

        for index in 0..count {
            if self.fill(LabelRecord::WIRE_SIZE)? < LabelRecord::WIRE_SIZE {
                return Err(WireError::MissingRecords {
                    record: "label",
                    expected: count,
                    received: index,
                });
            }
            let raw = self.buf.split_to(LabelRecord::WIRE_SIZE);
            labels.push(LabelRecord::decode(&raw)?.text);
        }

        debug!(labels = labels.len(), "decoded label block");
        Ok(labels)
    }

    /// Read a status record.
    pub fn read_status(&mut self) -> Result<StatusRecord> {
        let raw = self.take("status", StatusRecord::WIRE_SIZE)?;
        StatusRecord::decode(&raw)
    }

    /// Bytes received but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn layout(&self) -> &WireLayout {
        &self.layout
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
