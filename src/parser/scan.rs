//! Delimiter search over a bounded byte range.

/// Terminates the request line and every header line.
pub const CRLF: &[u8] = b"\r\n";

/// Terminates the header block.
pub const CRLF_CRLF: &[u8] = b"\r\n\r\n";

/// Find the first occurrence of `pattern` in `buffer[start..limit]`.
///
/// Only positions where the whole pattern fits before `limit` are considered.
/// `limit` is clamped to the buffer length, so passing the number of bytes read is
/// always safe.
///
/// # Examples
///
/// ```
/// use rawhttp_rs::parser::{index_of, CRLF};
///
/// let buffer = b"GET / HTTP/1.1\r\n";
/// assert_eq!(index_of(buffer, CRLF, 0, buffer.len()), Some(14));
/// assert_eq!(index_of(buffer, CRLF, 0, 15), None);
/// ```
pub fn index_of(buffer: &[u8], pattern: &[u8], start: usize, limit: usize) -> Option<usize> {
    let limit = limit.min(buffer.len());
    if pattern.is_empty() || start >= limit || limit - start < pattern.len() {
        return None;
    }

    buffer[start..limit]
        .windows(pattern.len())
        .position(|window| window == pattern)
        .map(|offset| start + offset)
}
