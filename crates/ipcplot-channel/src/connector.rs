use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use ipcplot_transport::{Endpoint, IpcStream, TransportError};

/// Opens the client side of a channel.
///
/// The seam between the cycle logic and the OS transport.
pub trait Connector: Send + Sync + 'static {
    type Stream: Read + Write + Send;

    fn connect(&self, endpoint: &Endpoint) -> Result<Self::Stream, TransportError>;
}

impl<C: Connector> Connector for Arc<C> {
    type Stream = C::Stream;

    fn connect(&self, endpoint: &Endpoint) -> Result<Self::Stream, TransportError> {
        (**self).connect(endpoint)
    }
}

/// Connects through the platform transport (named pipe or Unix socket).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemConnector {
    io_timeout: Option<Duration>,
}

impl SystemConnector {
    pub fn new(io_timeout: Option<Duration>) -> Self {
        Self { io_timeout }
    }
}

impl Connector for SystemConnector {
    type Stream = IpcStream;

    fn connect(&self, endpoint: &Endpoint) -> Result<IpcStream, TransportError> {
        let stream = ipcplot_transport::connect(endpoint)?;
        stream.set_io_timeout(self.io_timeout)?;
        Ok(stream)
    }
}
