//! HTTP request line parsing.

use std::fmt;

use crate::parser::error::Error;
use crate::parser::scan::{index_of, CRLF};

/// The first line of an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: String,
    path: String,
    version: String,
}

impl RequestLine {
    /// Create a request line from its three components.
    pub fn new(method: impl Into<String>, path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            version: version.into(),
        }
    }

    /// The request method, exactly as sent.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request path, including any query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The protocol version token, e.g. `HTTP/1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.path, self.version)
    }
}

/// Parse the request line out of the buffered bytes.
///
/// Returns the request line together with the offset of its terminating CRLF.
/// The method is not checked against any list; unknown methods are left for the
/// router to reject.
///
/// # Examples
///
/// ```
/// use rawhttp_rs::parser::parse_request_line;
///
/// let (line, end) = parse_request_line(b"DELETE /items/7 HTTP/1.1\r\n").unwrap();
/// assert_eq!(line.method(), "DELETE");
/// assert_eq!(line.path(), "/items/7");
/// assert_eq!(line.version(), "HTTP/1.1");
/// assert_eq!(end, 24);
/// ```
pub fn parse_request_line(buffer: &[u8]) -> Result<(RequestLine, usize), Error> {
    let line_end = index_of(buffer, CRLF, 0, buffer.len()).ok_or(Error::MissingRequestLine)?;
    let line = String::from_utf8_lossy(&buffer[..line_end]);

    let parts: Vec<&str> = line.split(' ').collect();
    let [method, path, version] = parts.as_slice() else {
        return Err(Error::MalformedRequestLine(line.to_string()));
    };

    if !path.starts_with('/') {
        return Err(Error::InvalidPath((*path).to_string()));
    }

    Ok((RequestLine::new(*method, *path, *version), line_end))
}
