//! Channel endpoints for the ipcplot helper protocol.
//!
//! A channel is a per-invocation duplex byte stream named after a process
//! identifier:
//! - Named pipes (`\\.\pipe\<id>`) on Windows
//! - Unix domain sockets (`<dir>/ipcplot-<id>.sock`) on Linux/macOS
//!
//! Connect failures are classified once here into an [`EndpointFault`] so
//! the layers above never inspect raw OS error numbers.

pub mod endpoint;
pub mod error;
pub mod fault;
pub mod traits;

#[cfg(windows)]
pub mod pipe;
#[cfg(unix)]
pub mod uds;

pub use endpoint::Endpoint;
pub use error::{Result, TransportError};
pub use fault::EndpointFault;
pub use traits::IpcStream;

#[cfg(unix)]
pub use uds::UnixDomainSocket;

/// Open a duplex connection to the endpoint's channel (blocking).
pub fn connect(endpoint: &Endpoint) -> Result<IpcStream> {
    endpoint.validate()?;

    #[cfg(unix)]
    {
        UnixDomainSocket::connect(endpoint.path())
    }

    #[cfg(windows)]
    {
        pipe::connect(endpoint.path())
    }

    #[cfg(not(any(unix, windows)))]
    {
        Err(TransportError::Unsupported(
            "ipcplot channels require named pipes or unix domain sockets",
        ))
    }
}
