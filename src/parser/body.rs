//! Request body extraction.

use std::io::Read;

use log::debug;

use crate::parser::error::Error;
use crate::parser::headers::find_header;
use crate::parser::request_line::RequestLine;
use crate::parser::scan::CRLF_CRLF;

/// Read the request body, if the request carries one.
///
/// `GET` requests never have a body, even when they send `Content-Length`. For any
/// other method the body is exactly `Content-Length` bytes following the header
/// terminator: whatever was already buffered is used first and the rest is read
/// from `stream`. A missing `Content-Length` means no body.
///
/// If the peer closes early the body holds whatever arrived.
pub fn extract_body<R: Read>(
    request_line: &RequestLine,
    headers: &[String],
    buffered: &[u8],
    headers_end: usize,
    stream: &mut R,
) -> Result<Option<String>, Error> {
    if request_line.method() == "GET" {
        return Ok(None);
    }

    let Some(value) = find_header(headers, "Content-Length") else {
        return Ok(None);
    };
    let length: usize = value
        .parse()
        .map_err(|_| Error::InvalidContentLength(value.to_string()))?;

    let body_start = (headers_end + CRLF_CRLF.len()).min(buffered.len());
    let available = &buffered[body_start..];
    let taken = available.len().min(length);

    // `length` comes from the client; only what has arrived is allocated up front.
    let mut body = Vec::with_capacity(taken);
    body.extend_from_slice(&available[..taken]);

    let remaining = (length - taken) as u64;
    if remaining > 0 {
        stream.take(remaining).read_to_end(&mut body)?;
    }
    if body.len() < length {
        debug!("Body truncated: expected {length} bytes, got {}", body.len());
    }

    Ok(Some(String::from_utf8_lossy(&body).into_owned()))
}
