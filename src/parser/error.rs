//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur during HTTP request parsing.
#[derive(Debug, Error)]
pub enum Error {
    /// The peer closed the connection without sending anything.
    #[error("Empty request")]
    EmptyRequest,

    /// No CRLF terminates the request line within the buffered bytes.
    #[error("Request line is not terminated")]
    MissingRequestLine,

    /// The request line does not split into exactly method, path and version.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The request path is not absolute.
    #[error("Invalid HTTP path: {0}")]
    InvalidPath(String),

    /// No CRLF-CRLF terminates the header block within the peek window.
    #[error("Header block is not terminated within {0} bytes")]
    MissingHeaderTerminator(usize),

    /// The `Content-Length` header value is not a non-negative integer.
    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// The path could not be parsed as a URI reference.
    #[error("Invalid request URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    /// Error reading from the connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error means the client sent a malformed request.
    ///
    /// Malformed requests are answered with `400 Bad Request`. Everything else is a
    /// fault that abandons the connection without a response.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::EmptyRequest
                | Error::MissingRequestLine
                | Error::MalformedRequestLine(_)
                | Error::InvalidPath(_)
                | Error::MissingHeaderTerminator(_)
                | Error::InvalidContentLength(_)
        )
    }
}
