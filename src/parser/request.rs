//! HTTP request representation.

use serde::de::DeserializeOwned;

use crate::parser::error::Error;
use crate::parser::request_line::RequestLine;

/// A fully parsed HTTP request.
///
/// Requests are assembled with a [`RequestBuilder`] and are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    request_line: RequestLine,
    headers: Vec<String>,
    body: Option<String>,
    query_params: Vec<(String, String)>,
}

impl Request {
    /// Start building a request from its parsed request line.
    pub fn builder(request_line: RequestLine) -> RequestBuilder {
        RequestBuilder::new(request_line)
    }

    /// The request line.
    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    /// Shorthand for `request_line().method()`.
    pub fn method(&self) -> &str {
        self.request_line.method()
    }

    /// Shorthand for `request_line().path()`.
    pub fn path(&self) -> &str {
        self.request_line.path()
    }

    /// The raw header lines, in the order they were received.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The request body, if one was read.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// All decoded query parameters, in order.
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    /// Values of every query parameter whose name starts with `name`.
    ///
    /// Matching is by prefix, so `query_param("q")` also returns the value of a
    /// parameter named `query`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rawhttp_rs::parser::{Request, RequestLine};
    ///
    /// let request = Request::builder(RequestLine::new("GET", "/", "HTTP/1.1"))
    ///     .query_params(vec![
    ///         ("q".to_string(), "cat".to_string()),
    ///         ("query".to_string(), "dog".to_string()),
    ///     ])
    ///     .build();
    /// assert_eq!(request.query_param("q"), vec!["cat", "dog"]);
    /// assert!(request.query_param("x").is_empty());
    /// ```
    pub fn query_param(&self, name: &str) -> Vec<&str> {
        self.query_params
            .iter()
            .filter(|(param, _)| param.starts_with(name))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Get the value of a header by its exact name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    /// Check if the request has a JSON body.
    pub fn is_json(&self) -> bool {
        self.header("Content-Type")
            .is_some_and(|content_type| content_type.starts_with("application/json"))
    }

    /// Parse the request body as JSON.
    ///
    /// A request without a body is parsed as an empty document, which fails for
    /// every type except those that accept no input.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let json = serde_json::from_str(self.body.as_deref().unwrap_or_default())?;
        Ok(json)
    }
}

/// Accumulates the parts of a [`Request`] as the parse pipeline produces them.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    request_line: RequestLine,
    headers: Vec<String>,
    body: Option<String>,
    query_params: Vec<(String, String)>,
}

impl RequestBuilder {
    /// Start a builder with no headers, no body and no query parameters.
    pub fn new(request_line: RequestLine) -> Self {
        Self {
            request_line,
            headers: Vec::new(),
            body: None,
            query_params: Vec::new(),
        }
    }

    /// Set the raw header lines.
    pub fn headers(mut self, headers: Vec<String>) -> Self {
        self.headers = headers;
        self
    }

    /// Set the body; `None` when no body was read.
    pub fn body(mut self, body: Option<String>) -> Self {
        self.body = body;
        self
    }

    /// Set the decoded query parameters.
    pub fn query_params(mut self, query_params: Vec<(String, String)>) -> Self {
        self.query_params = query_params;
        self
    }

    /// Finish the request.
    pub fn build(self) -> Request {
        Request {
            request_line: self.request_line,
            headers: self.headers,
            body: self.body,
            query_params: self.query_params,
        }
    }
}
