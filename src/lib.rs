//! A minimal blocking HTTP/1.1 server.
//!
//! This library reads HTTP requests straight off a byte stream, without an
//! external HTTP library, and hands them to handlers registered for an exact
//! method and path.
//!
//! # Features
//!
//! - Request line and header parsing out of a fixed 4096-byte peek window
//! - `Content-Length` bodies for every method except `GET`
//! - Percent-decoded query parameters with prefix lookup
//! - A concurrent route table that can be shared between servers and tests
//! - One blocking worker per connection, 64 workers by default
//!
//! # Examples
//!
//! ## Parsing
//!
//! ```
//! use rawhttp_rs::parse_request;
//!
//! let bytes = b"GET /search?q=cat&q=dog HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let request = parse_request(bytes, &mut std::io::empty()).unwrap();
//!
//! assert_eq!(request.method(), "GET");
//! assert_eq!(request.path(), "/search?q=cat&q=dog");
//! assert_eq!(request.headers(), ["Host: example.com"]);
//! assert_eq!(request.query_param("q"), vec!["cat", "dog"]);
//! ```
//!
//! ## Serving
//!
//! ```no_run
//! use rawhttp_rs::{HttpResponse, HttpServer, ServerConfig, StatusCode};
//!
//! let server = HttpServer::new(ServerConfig::default());
//! server.add_handler("GET", "/hello", |_request, out| {
//!     HttpResponse::new(StatusCode::Ok)
//!         .with_content_type("text/plain")
//!         .with_body_string("Hello, World!")
//!         .write_to(out)
//! });
//!
//! server.listen(8080).unwrap();
//! ```
//!
//! See the `demos` directory for a complete server.

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{parse_request, Error as ParserError, Request, RequestLine};
pub use server::{
    Error as ServerError, HttpResponse, HttpServer, Outcome, RouteTable, ServerConfig, StatusCode,
};
