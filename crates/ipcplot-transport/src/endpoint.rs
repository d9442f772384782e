use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, TransportError};

/// Prefix of the local named pipe namespace on Windows.
pub const PIPE_NAMESPACE: &str = r"\\.\pipe\";

/// File name prefix for channel sockets on Unix.
pub const SOCKET_PREFIX: &str = "ipcplot-";

/// Maximum channel identifier length.
const MAX_ID_LEN: usize = 64;

/// The name of one helper channel.
///
/// The host creates the channel under a name derived from the helper's
/// process identifier. The identifier is carried explicitly so a client can
/// be pointed at any channel, not only the one matching its own PID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    id: String,
    path: PathBuf,
}

impl Endpoint {
    /// Endpoint for an arbitrary channel identifier.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let path = resolve_path(&id, None);
        Self { id, path }
    }

    /// Endpoint named after a process identifier.
    pub fn for_process(pid: u32) -> Self {
        Self::new(pid.to_string())
    }

    /// Endpoint named after the calling process.
    pub fn for_current_process() -> Self {
        Self::for_process(std::process::id())
    }

    /// Place the socket file in `dir` instead of the system temp dir.
    ///
    /// Ignored on Windows, where pipes live in a fixed namespace.
    pub fn with_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir: PathBuf = dir.into();
        self.path = resolve_path(&self.id, Some(&dir));
        self
    }

    /// The channel identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The platform path of the channel.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let reason = if self.id.is_empty() {
            Some("must not be empty")
        } else if self.id.len() > MAX_ID_LEN {
            Some("longer than 64 bytes")
        } else if self.id.contains(['/', '\\', '\0']) {
            Some("contains a path separator or NUL")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(TransportError::InvalidEndpoint {
                id: self.id.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(windows)]
fn resolve_path(id: &str, _dir: Option<&Path>) -> PathBuf {
    PathBuf::from(format!("{PIPE_NAMESPACE}{id}"))
}

#[cfg(not(windows))]
fn resolve_path(id: &str, dir: Option<&Path>) -> PathBuf {
    let dir = dir.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
    dir.join(format!("{SOCKET_PREFIX}{id}.sock"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_endpoint_uses_decimal_pid() {
        let endpoint = Endpoint::for_process(4242);
        assert_eq!(endpoint.id(), "4242");
        #[cfg(unix)]
        assert!(endpoint.path().ends_with("ipcplot-4242.sock"));
        #[cfg(windows)]
        assert_eq!(endpoint.path(), Path::new(r"\\.\pipe\4242"));
    }

    #[test]
    fn current_process_endpoint_matches_pid() {
        let endpoint = Endpoint::for_current_process();
        assert_eq!(endpoint.id(), std::process::id().to_string());
    }

    #[cfg(unix)]
    #[test]
    fn directory_override_moves_socket() {
        let endpoint = Endpoint::new("17").with_directory("/run/ipcplot");
        assert_eq!(endpoint.path(), Path::new("/run/ipcplot/ipcplot-17.sock"));
        assert_eq!(endpoint.to_string(), "/run/ipcplot/ipcplot-17.sock");
    }

    #[test]
    fn validate_rejects_bad_ids() {
        assert!(Endpoint::new("").validate().is_err());
        assert!(Endpoint::new("../etc").validate().is_err());
        assert!(Endpoint::new(r"a\b").validate().is_err());
        assert!(Endpoint::new("x".repeat(65)).validate().is_err());
        assert!(Endpoint::new("12345").validate().is_ok());
    }
}
