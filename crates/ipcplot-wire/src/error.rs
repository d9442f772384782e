/// Errors that can occur while encoding or decoding records.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A buffer or stream ended inside a record.
    #[error("short {record} record ({received} of {expected} bytes)")]
    ShortRecord {
        record: &'static str,
        expected: usize,
        received: usize,
    },

    /// The stream ended before the declared number of records arrived.
    #[error("missing {record} records ({received} of {expected} received)")]
    MissingRecords {
        record: &'static str,
        expected: usize,
        received: usize,
    },

    /// `columns * rows` does not fit the platform's address space.
    #[error("sample count overflows ({columns} columns x {rows} rows)")]
    SampleCountOverflow { columns: u32, rows: u32 },

    /// The header declares more samples than the host buffer can carry.
    #[error("{samples} samples exceed host capacity of {capacity}")]
    ExceedsCapacity { samples: usize, capacity: usize },

    /// The peer stopped accepting bytes mid-record.
    #[error("connection closed (incomplete record write)")]
    ConnectionClosed,

    /// An I/O error occurred while reading or writing records.
    #[error("record I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WireError {
    /// True when fewer bytes or records arrived than were declared.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            Self::ShortRecord { .. } | Self::MissingRecords { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, WireError>;
