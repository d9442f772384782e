use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, WireError};
use crate::layout::WireLayout;
use crate::status::StatusCode;
use crate::text::{decode_fixed, put_fixed};

/// Capacity of each status text field.
pub const STATUS_TEXT_CAPACITY: usize = 1024;

/// Capacity of a column label.
pub const LABEL_CAPACITY: usize = 128;

fn ensure_len(record: &'static str, src: &[u8], expected: usize) -> Result<()> {
    if src.len() < expected {
        return Err(WireError::ShortRecord {
            record,
            expected,
            received: src.len(),
        });
    }
    Ok(())
}

/// Outcome signal exchanged at the end of every cycle.
///
/// ```text
/// ┌────────────┬──────────────┬──────────────┬──────────────┐
/// │ code (4B)  │ message      │ help         │ context      │
/// │ u32 LE     │ char[1024]   │ char[1024]   │ char[1024]   │
/// └────────────┴──────────────┴──────────────┴──────────────┘
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRecord {
    pub code: StatusCode,
    pub message: String,
    pub help: String,
    /// Where the status originated (host: source location; helper: cycle).
    pub context: String,
}

impl StatusRecord {
    pub const WIRE_SIZE: usize = 4 + 3 * STATUS_TEXT_CAPACITY;

    pub fn new(
        code: StatusCode,
        message: impl Into<String>,
        help: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            help: help.into(),
            context: context.into(),
        }
    }

    /// Acknowledgement written at the end of a data cycle.
    pub fn ack() -> Self {
        Self::default()
    }

    /// Completion handshake success.
    pub fn complete() -> Self {
        Self::from_code(StatusCode::COMPLETE)
    }

    /// Status with the canonical message and help text for `code`.
    pub fn from_code(code: StatusCode) -> Self {
        let (message, help) = code.describe().unwrap_or_default();
        Self::new(code, message, help, "")
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(Self::WIRE_SIZE);
        dst.put_u32_le(self.code.as_u32());
        put_fixed(dst, &self.message, STATUS_TEXT_CAPACITY);
        put_fixed(dst, &self.help, STATUS_TEXT_CAPACITY);
        put_fixed(dst, &self.context, STATUS_TEXT_CAPACITY);
    }

    pub fn decode(mut src: &[u8]) -> Result<Self> {
        ensure_len("status", src, Self::WIRE_SIZE)?;
        let code = StatusCode(src.get_u32_le());
        let mut text = || {
            let value = decode_fixed(&src[..STATUS_TEXT_CAPACITY]);
            src.advance(STATUS_TEXT_CAPACITY);
            value
        };
        let message = text();
        let help = text();
        let context = text();
        Ok(Self {
            code,
            message,
            help,
            context,
        })
    }
}

/// Shape of the forthcoming bulk transfer.
///
/// On the wire the counts are followed by the host's label and buffer
/// pointers; those are written as zero and skipped on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRecord {
    pub column_count: u32,
    pub row_count: u32,
}

impl HeaderRecord {
    pub fn new(column_count: u32, row_count: u32) -> Self {
        Self {
            column_count,
            row_count,
        }
    }

    /// Declared number of samples, `columns * rows`.
    pub fn sample_count(&self) -> Result<usize> {
        (self.column_count as usize)
            .checked_mul(self.row_count as usize)
            .ok_or(WireError::SampleCountOverflow {
                columns: self.column_count,
                rows: self.row_count,
            })
    }

    /// Declared number of labels, one per column.
    pub fn label_count(&self) -> usize {
        self.column_count as usize
    }

    pub fn encode(&self, layout: &WireLayout, dst: &mut BytesMut) {
        let size = layout.header_size();
        dst.reserve(size);
        dst.put_u32_le(self.column_count);
        dst.put_u32_le(self.row_count);
        dst.put_bytes(0, size - 8);
    }

    pub fn decode(mut src: &[u8], layout: &WireLayout) -> Result<Self> {
        ensure_len("header", src, layout.header_size())?;
        let column_count = src.get_u32_le();
        let row_count = src.get_u32_le();
        Ok(Self {
            column_count,
            row_count,
        })
    }
}

/// One numeric data point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRecord {
    pub value: f64,
}

impl SampleRecord {
    pub const WIRE_SIZE: usize = 8;

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.put_f64_le(self.value);
    }

    pub fn decode(mut src: &[u8]) -> Result<Self> {
        ensure_len("sample", src, Self::WIRE_SIZE)?;
        Ok(Self {
            value: src.get_f64_le(),
        })
    }
}

/// One column's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    pub text: String,
}

impl LabelRecord {
    pub const WIRE_SIZE: usize = LABEL_CAPACITY;

    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        put_fixed(dst, &self.text, LABEL_CAPACITY);
    }

    pub fn decode(src: &[u8]) -> Result<Self> {
        ensure_len("label", src, Self::WIRE_SIZE)?;
        Ok(Self {
            text: decode_fixed(&src[..LABEL_CAPACITY]),
        })
    }
}
