//! Header block parsing.

use crate::parser::error::Error;
use crate::parser::scan::{index_of, CRLF, CRLF_CRLF};

/// Split the header block that follows the request line into raw header lines.
///
/// `line_end` is the offset of the request line's CRLF. The block starts right
/// after that CRLF and ends at the first CRLF-CRLF. Lines are returned in the order
/// they were sent, as `"Name: value"` strings without further validation.
///
/// Returns the header lines and the offset of the terminating CRLF-CRLF.
pub fn parse_headers(buffer: &[u8], line_end: usize) -> Result<(Vec<String>, usize), Error> {
    let headers_end = index_of(buffer, CRLF_CRLF, line_end, buffer.len())
        .ok_or(Error::MissingHeaderTerminator(buffer.len()))?;

    // The terminator may start on the request line's own CRLF.
    let headers_start = line_end + CRLF.len();
    if headers_end < headers_start {
        return Ok((Vec::new(), headers_end));
    }

    let block = String::from_utf8_lossy(&buffer[headers_start..headers_end]);
    let headers = block.split("\r\n").map(str::to_string).collect();

    Ok((headers, headers_end))
}

/// Find the value of the first header whose name starts with `name`, ignoring
/// ASCII case.
///
/// The value is everything after the first `:`, trimmed. A matching line without
/// a colon yields an empty value.
pub fn find_header<'a>(headers: &'a [String], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|line| {
            line.as_bytes()
                .get(..name.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(name.as_bytes()))
        })
        .map(|line| line.split_once(':').map_or("", |(_, value)| value.trim()))
}
