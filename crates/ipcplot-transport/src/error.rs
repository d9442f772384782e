use std::path::PathBuf;

use crate::fault::EndpointFault;

/// Errors that can occur in channel transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind the host side of a channel.
    #[error("failed to bind to {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to open the client side of a channel.
    #[error("failed to connect to {path} ({fault}): {source}")]
    Connect {
        path: PathBuf,
        fault: EndpointFault,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// An I/O error occurred on the channel stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// The channel identifier cannot be turned into an endpoint name.
    #[error("invalid channel id {id:?}: {reason}")]
    InvalidEndpoint { id: String, reason: &'static str },

    /// The platform has no channel transport.
    #[error("unsupported platform: {0}")]
    Unsupported(&'static str),
}

impl TransportError {
    pub(crate) fn connect(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Connect {
            path: path.into(),
            fault: EndpointFault::classify(&source),
            source,
        }
    }

    /// Endpoint fault class for this error.
    pub fn fault(&self) -> EndpointFault {
        match self {
            Self::Connect { fault, .. } => *fault,
            Self::Io(source) | Self::Accept(source) => EndpointFault::classify(source),
            _ => EndpointFault::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
