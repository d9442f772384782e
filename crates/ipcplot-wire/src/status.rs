use std::fmt;
use std::str::FromStr;

/// Status code carried by a [`StatusRecord`](crate::StatusRecord).
///
/// Error codes use the high 16 bits; the low 16 bits are reserved for the
/// completion sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u32);

impl StatusCode {
    /// Data transfer acknowledged; the host keeps the session open. Default.
    pub const ACK: Self = Self(0x0000_0000);
    /// Helper finished successfully.
    pub const COMPLETE: Self = Self(0x0000_FFFF);
    pub const INPUT_PTR_NULL: Self = Self(0x0001_0000);
    pub const CLIENT_NOT_FOUND: Self = Self(0x0002_0000);
    pub const WIN_API_ERR: Self = Self(0x0003_0000);
    pub const BUFFER_OVERFLOW: Self = Self(0x0004_0000);
    pub const SERVER_TIMEOUT: Self = Self(0x0005_0000);
    pub const NOT_FIRST_ERROR: Self = Self(0x0006_0000);
    /// The helper received data but could not present it.
    pub const PRESENTATION_FAILED: Self = Self(0x0007_0000);

    /// Every code with a canonical name.
    pub const KNOWN: [Self; 9] = [
        Self::ACK,
        Self::COMPLETE,
        Self::INPUT_PTR_NULL,
        Self::CLIENT_NOT_FOUND,
        Self::WIN_API_ERR,
        Self::BUFFER_OVERFLOW,
        Self::SERVER_TIMEOUT,
        Self::NOT_FIRST_ERROR,
        Self::PRESENTATION_FAILED,
    ];

    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// True for the two non-error codes.
    pub fn is_success(self) -> bool {
        self == Self::ACK || self == Self::COMPLETE
    }

    /// Short symbolic name, `None` for codes this side does not know.
    pub fn name(self) -> Option<&'static str> {
        self.canonical().map(|(name, _, _)| name)
    }

    /// Canonical `(message, help)` text for known error codes.
    pub fn describe(self) -> Option<(&'static str, &'static str)> {
        self.canonical().map(|(_, message, help)| (message, help))
    }

    fn canonical(self) -> Option<(&'static str, &'static str, &'static str)> {
        let entry = match self {
            Self::ACK => ("ACK", "", ""),
            Self::COMPLETE => ("COMPLETE", "", ""),
            Self::INPUT_PTR_NULL => (
                "INPUT_PTR_NULL",
                "Input is a null pointer",
                "Check the input of the function",
            ),
            Self::CLIENT_NOT_FOUND => (
                "CLIENT_NOT_FOUND",
                "The plotting client could not be found",
                "Check the directory again",
            ),
            Self::WIN_API_ERR => (
                "WIN_API_ERR",
                "Error occurred while calling WinAPI",
                "GetLastError() returned with ",
            ),
            Self::BUFFER_OVERFLOW => (
                "BUFFER_OVERFLOW",
                "The buffer size is not large enough",
                "Reduce the input size",
            ),
            Self::SERVER_TIMEOUT => (
                "SERVER_TIMEOUT",
                "The plotting client failed to connect to the named pipe within timeout period",
                "Check the plotting client and the named pipe is configured correctly",
            ),
            Self::NOT_FIRST_ERROR => (
                "NOT_FIRST_ERROR",
                "An error occurred earlier without logging any error info",
                "Ensure the error is logged properly",
            ),
            Self::PRESENTATION_FAILED => (
                "PRESENTATION_FAILED",
                "The plotting client could not present the data",
                "Check the client log for the rendering error",
            ),
            _ => return None,
        };
        Some(entry)
    }
}

impl From<u32> for StatusCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

/// Accepts a canonical name (case-insensitive), a decimal number, or a
/// `0x`-prefixed hex number.
impl FromStr for StatusCode {
    type Err = ParseStatusCodeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if let Some(code) = Self::KNOWN
            .into_iter()
            .find(|code| code.name().is_some_and(|name| name.eq_ignore_ascii_case(trimmed)))
        {
            return Ok(code);
        }

        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => trimmed.parse(),
        };
        parsed
            .map(Self)
            .map_err(|_| ParseStatusCodeError(input.to_string()))
    }
}

/// Input to [`StatusCode::from_str`] was neither a known name nor a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status code {0:?}")]
pub struct ParseStatusCodeError(String);

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} (0x{:08X})", self.0),
            None => write!(f, "0x{:08X}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_codes() {
        assert!(StatusCode::ACK.is_success());
        assert!(StatusCode::COMPLETE.is_success());
        assert!(!StatusCode::BUFFER_OVERFLOW.is_success());
        assert!(!StatusCode(0x1234_0000).is_success());
    }

    #[test]
    fn display_includes_name_and_hex() {
        assert_eq!(StatusCode::COMPLETE.to_string(), "COMPLETE (0x0000FFFF)");
        assert_eq!(StatusCode(0xDEAD_0000).to_string(), "0xDEAD0000");
    }

    #[test]
    fn parses_names_and_numbers() {
        assert_eq!("complete".parse::<StatusCode>().unwrap(), StatusCode::COMPLETE);
        assert_eq!("0x00040000".parse::<StatusCode>().unwrap(), StatusCode::BUFFER_OVERFLOW);
        assert_eq!("65535".parse::<StatusCode>().unwrap(), StatusCode::COMPLETE);
        assert_eq!("0xABCD0000".parse::<StatusCode>().unwrap(), StatusCode(0xABCD_0000));
        assert!("bogus".parse::<StatusCode>().is_err());
    }

    #[test]
    fn unknown_codes_have_no_description() {
        assert!(StatusCode(0x00AB_0000).describe().is_none());
        let (message, help) = StatusCode::BUFFER_OVERFLOW.describe().unwrap();
        assert_eq!(message, "The buffer size is not large enough");
        assert_eq!(help, "Reduce the input size");
    }
}
