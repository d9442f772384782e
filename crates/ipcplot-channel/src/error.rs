use std::io;
use std::path::PathBuf;

use ipcplot_transport::{EndpointFault, TransportError};
use ipcplot_wire::WireError;

/// Errors that end a channel cycle.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// No host is listening: never created, or already torn down.
    ///
    /// Callers usually treat this as "nothing to do".
    #[error("channel endpoint {endpoint} not found")]
    EndpointNotFound { endpoint: PathBuf },

    /// The host closed the channel while this side was connected.
    #[error("channel severed: {0}")]
    EndpointSevered(#[source] io::Error),

    /// The endpoint stayed busy for the configured number of attempts.
    #[error("channel endpoint {endpoint} still busy after {attempts} attempts")]
    EndpointBusy { endpoint: PathBuf, attempts: u32 },

    /// Fewer bytes or records arrived than the header declared.
    #[error("incomplete transfer: {0}")]
    DecodeIncomplete(#[source] WireError),

    /// The host declared a transfer this side cannot accept.
    #[error("malformed transfer: {0}")]
    Wire(#[source] WireError),

    /// Any other transport failure.
    #[error("transport failure: {0}")]
    TransportOther(#[source] TransportError),

    /// The cycle worker could not be started.
    #[error("failed to start channel worker: {0}")]
    WorkerSpawn(#[source] io::Error),

    /// The cycle worker panicked.
    #[error("channel worker panicked")]
    WorkerPanicked,
}

impl ChannelError {
    /// True for outcomes that mean "no host, nothing to do".
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::EndpointNotFound { .. })
    }

    /// Map an I/O error raised mid-transfer.
    fn from_io(err: io::Error) -> Self {
        match EndpointFault::classify(&err) {
            EndpointFault::Severed => Self::EndpointSevered(err),
            _ => Self::TransportOther(TransportError::Io(err)),
        }
    }
}

impl From<WireError> for ChannelError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::Io(io) => Self::from_io(io),
            WireError::ConnectionClosed => Self::EndpointSevered(io::Error::new(
                io::ErrorKind::WriteZero,
                "peer stopped accepting bytes",
            )),
            err if err.is_incomplete() => Self::DecodeIncomplete(err),
            err => Self::Wire(err),
        }
    }
}

impl From<TransportError> for ChannelError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Io(io) => Self::from_io(io),
            other => Self::TransportOther(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
