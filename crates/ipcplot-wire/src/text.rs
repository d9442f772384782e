//! Fixed-capacity, NUL-padded UTF-8 text fields.
//!
//! The host copies at most `N - 1` bytes into a zeroed `char[N]`, so a
//! field always holds a terminator. Decoding stops at the first NUL; the
//! padding after it is never part of the text.

use bytes::BufMut;

/// Strip NUL padding: the bytes before the first NUL.
pub fn trim_padding(raw: &[u8]) -> &[u8] {
    match raw.iter().position(|&b| b == 0) {
        Some(end) => &raw[..end],
        None => raw,
    }
}

/// Decode a fixed-capacity text field.
///
/// Invalid UTF-8 (e.g. a multi-byte character cut by host truncation) is
/// replaced rather than rejected.
pub fn decode_fixed(raw: &[u8]) -> String {
    String::from_utf8_lossy(trim_padding(raw)).into_owned()
}

/// Encode `text` into exactly `capacity` bytes.
///
/// Text longer than `capacity - 1` bytes is cut at a character boundary.
pub fn put_fixed(dst: &mut impl BufMut, text: &str, capacity: usize) {
    let limit = capacity.saturating_sub(1);
    let mut end = text.len().min(limit);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    dst.put_slice(&text.as_bytes()[..end]);
    dst.put_bytes(0, capacity - end);
}
