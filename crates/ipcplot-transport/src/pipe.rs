use std::path::Path;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::IpcStream;

/// Open an existing named pipe for duplex access (blocking).
///
/// The handle stays in byte read mode, so a host writing in message mode is
/// read as one continuous stream and records may span read calls.
pub fn connect(path: impl AsRef<Path>) -> Result<IpcStream> {
    let path = path.as_ref();
    let pipe = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| TransportError::connect(path, e))?;
    debug!(?path, "connected to named pipe");
    Ok(IpcStream::from_pipe(pipe))
}
