//! HTTP parser module.
//!
//! Parses a request out of the bytes buffered from a connection: the request
//! line, the raw header lines, an optional body and the decoded query string.
//! No external HTTP library is involved; every boundary is found with a plain
//! delimiter search over the buffered bytes.

mod body;
mod error;
mod headers;
mod query;
mod request;
mod request_line;
mod scan;

use std::fmt;
use std::io::Read;

// Re-export public items
pub use body::extract_body;
pub use error::Error;
pub use headers::{find_header, parse_headers};
pub use query::decode_query;
pub use request::{Request, RequestBuilder};
pub use request_line::{parse_request_line, RequestLine};
pub use scan::{index_of, CRLF, CRLF_CRLF};

/// A step of the parse pipeline that has just completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LineParsed,
    HeadersParsed,
    BodyExtracted,
    QueryDecoded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Run the whole parse pipeline over `buffered`, reading any body bytes that
/// were not buffered from `stream`.
///
/// # Examples
///
/// ```
/// use rawhttp_rs::parser::parse_request;
///
/// let bytes = b"POST /notes?tag=a HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi";
/// let request = parse_request(bytes, &mut std::io::empty()).unwrap();
///
/// assert_eq!(request.method(), "POST");
/// assert_eq!(request.headers(), ["Content-Length: 2"]);
/// assert_eq!(request.body(), Some("hi"));
/// assert_eq!(request.query_param("tag"), vec!["a"]);
/// ```
pub fn parse_request<R: Read>(buffered: &[u8], stream: &mut R) -> Result<Request, Error> {
    parse_request_traced(buffered, stream, |_| {})
}

/// Same as [`parse_request`], calling `on_stage` after each step succeeds.
pub fn parse_request_traced<R, F>(buffered: &[u8], stream: &mut R, mut on_stage: F) -> Result<Request, Error>
where
    R: Read,
    F: FnMut(Stage),
{
    if buffered.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let (request_line, line_end) = parse_request_line(buffered)?;
    on_stage(Stage::LineParsed);

    let (headers, headers_end) = parse_headers(buffered, line_end)?;
    on_stage(Stage::HeadersParsed);

    let body = extract_body(&request_line, &headers, buffered, headers_end, stream)?;
    on_stage(Stage::BodyExtracted);

    let query_params = decode_query(request_line.path())?;
    on_stage(Stage::QueryDecoded);

    Ok(Request::builder(request_line)
        .headers(headers)
        .body(body)
        .query_params(query_params)
        .build())
}
