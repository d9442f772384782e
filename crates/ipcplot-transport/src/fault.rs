use std::fmt;
use std::io;

/// How a channel endpoint failed, decoded once from the OS error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointFault {
    /// The host never created the endpoint, or already tore it down.
    NotFound,
    /// Another client holds the only pipe instance.
    Busy,
    /// The peer closed the channel while connected.
    Severed,
    /// Anything else.
    Other,
}

impl EndpointFault {
    /// Classify an I/O error raised by the channel transport.
    pub fn classify(err: &io::Error) -> Self {
        if let Some(fault) = err.raw_os_error().and_then(classify_os_error) {
            return fault;
        }

        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => Self::NotFound,
            io::ErrorKind::WouldBlock => Self::Busy,
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected => Self::Severed,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "endpoint not found",
            Self::Busy => "endpoint busy",
            Self::Severed => "endpoint severed",
            Self::Other => "transport failure",
        }
    }
}

impl fmt::Display for EndpointFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(windows)]
fn classify_os_error(code: i32) -> Option<EndpointFault> {
    use windows_sys::Win32::Foundation::{
        ERROR_BROKEN_PIPE, ERROR_FILE_NOT_FOUND, ERROR_NO_DATA, ERROR_PIPE_BUSY,
        ERROR_PIPE_NOT_CONNECTED,
    };

    match code as u32 {
        ERROR_FILE_NOT_FOUND => Some(EndpointFault::NotFound),
        ERROR_PIPE_BUSY => Some(EndpointFault::Busy),
        ERROR_BROKEN_PIPE | ERROR_NO_DATA | ERROR_PIPE_NOT_CONNECTED => {
            Some(EndpointFault::Severed)
        }
        _ => None,
    }
}

#[cfg(unix)]
fn classify_os_error(code: i32) -> Option<EndpointFault> {
    match code {
        libc::ENOENT | libc::ECONNREFUSED => Some(EndpointFault::NotFound),
        libc::EAGAIN => Some(EndpointFault::Busy),
        libc::EPIPE | libc::ECONNRESET => Some(EndpointFault::Severed),
        _ => None,
    }
}

#[cfg(not(any(unix, windows)))]
fn classify_os_error(_code: i32) -> Option<EndpointFault> {
    None
}
