use crate::error::{Result, WireError};

/// Sample slots in the host's fixed transfer buffer (1 MiB of doubles).
pub const DEFAULT_SAMPLE_CAPACITY: usize = 131_072;

/// Pointer width of the host process.
///
/// The header struct carries two host pointers after the counts. They have
/// no meaning on this side but still occupy bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
    Bits32,
    Bits64,
}

impl PointerWidth {
    pub fn bytes(self) -> usize {
        match self {
            Self::Bits32 => 4,
            Self::Bits64 => 8,
        }
    }
}

/// Host-dependent parts of the record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireLayout {
    /// Pointer width of the host build. Default: 64-bit.
    pub pointer_width: PointerWidth,
    /// When set, the host always sends this many sample slots and the
    /// unused tail is padding. When `None`, exactly `columns * rows`
    /// samples are sent.
    pub sample_capacity: Option<usize>,
}

impl Default for WireLayout {
    fn default() -> Self {
        Self {
            pointer_width: PointerWidth::Bits64,
            sample_capacity: Some(DEFAULT_SAMPLE_CAPACITY),
        }
    }
}

impl WireLayout {
    /// Layout with no sample padding.
    pub fn exact() -> Self {
        Self {
            sample_capacity: None,
            ..Self::default()
        }
    }

    /// Encoded size of a header record.
    ///
    /// Two `u32` counts followed by two pointers. The counts fill 8 bytes,
    /// so pointer alignment never adds padding.
    pub fn header_size(&self) -> usize {
        8 + 2 * self.pointer_width.bytes()
    }

    /// Number of sample slots on the wire for `samples` declared samples.
    pub fn sample_block_len(&self, samples: usize) -> Result<usize> {
        match self.sample_capacity {
            Some(capacity) if samples > capacity => {
                Err(WireError::ExceedsCapacity { samples, capacity })
            }
            Some(capacity) => Ok(capacity),
            None => Ok(samples),
        }
    }
}
