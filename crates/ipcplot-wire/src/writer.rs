use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};

use crate::error::{Result, WireError};
use crate::layout::WireLayout;
use crate::record::{HeaderRecord, LabelRecord, StatusRecord};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes whole records to any `Write` stream.
pub struct RecordWriter<T> {
    inner: T,
    buf: BytesMut,
    layout: WireLayout,
}

impl<T: Write> RecordWriter<T> {
    /// Create a record writer for the default host layout.
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

    /// Write a status record and flush.
    pub fn write_status(&mut self, status: &StatusRecord) -> Result<()> {
        self.buf.clear();
        status.encode(&mut self.buf);
        self.send_buffer()
    }

    /// Write a header record.
    pub fn write_header(&mut self, header: &HeaderRecord) -> Result<()> {
        self.buf.clear();
        header.encode(&self.layout, &mut self.buf);
        self.send_buffer()
    }

    /// Write the sample block, zero-padding to the layout's capacity.
    pub fn write_samples(&mut self, samples: &[f64]) -> Result<()> {
        let slots = self.layout.sample_block_len(samples.len())?;
        self.buf.clear();
        self.buf.reserve(slots * 8);
        for value in samples {
            self.buf.put_f64_le(*value);
        }
        self.buf.put_bytes(0, (slots - samples.len()) * 8);
        self.send_buffer()
    }

    /// Write one label record per entry.
    pub fn write_labels<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<()> {
        self.buf.clear();
        for label in labels {
            LabelRecord::new(label.as_ref()).encode(&mut self.buf);
        }
        self.send_buffer()
    }

    fn send_buffer(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(WireError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(WireError::Io(err)),
            }
        }
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(WireError::Io(err)),
            }
        }
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::reader::RecordReader;

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipeWriter;

    impl Write for BrokenPipeWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn host_side_stream_is_readable_by_client() {
        let layout = WireLayout {
            sample_capacity: Some(8),
            ..WireLayout::default()
        };
        let mut writer = RecordWriter::with_layout(Vec::new(), layout);
        let header = HeaderRecord::new(2, 3);
        writer.write_header(&header).unwrap();
        writer
            .write_samples(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        writer.write_labels(&["A", "B"]).unwrap();
        let wire = writer.into_inner();
        assert_eq!(wire.len(), 24 + 8 * 8 + 2 * 128);

        let mut reader = RecordReader::with_layout(Cursor::new(wire), layout);
        let header = reader.read_header().unwrap();
        assert_eq!(
            reader.read_samples(&header).unwrap(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
        assert_eq!(reader.read_labels(&header).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn status_write_is_fixed_size() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_status(&StatusRecord::ack()).unwrap();
        assert_eq!(writer.into_inner().len(), StatusRecord::WIRE_SIZE);
    }

    #[test]
    fn oversized_sample_block_is_rejected() {
        let layout = WireLayout {
            sample_capacity: Some(2),
            ..WireLayout::default()
        };
        let mut writer = RecordWriter::with_layout(Vec::new(), layout);
        let err = writer.write_samples(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, WireError::ExceedsCapacity { .. }));
        assert!(writer.into_inner().is_empty());
    }

    #[test]
    fn zero_length_write_is_connection_closed() {
        let mut writer = RecordWriter::new(ZeroWriter);
        let err = writer.write_status(&StatusRecord::complete()).unwrap_err();
        assert!(matches!(err, WireError::ConnectionClosed));
    }

    #[test]
    fn broken_pipe_surfaces_as_io() {
        let mut writer = RecordWriter::new(BrokenPipeWriter);
        let err = writer.write_status(&StatusRecord::complete()).unwrap_err();
        assert!(matches!(err, WireError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }
}
