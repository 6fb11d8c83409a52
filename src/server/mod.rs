//! HTTP server implementation for rawhttp-rs.
//!
//! This module accepts connections, runs the parser over each one on a pool of
//! blocking workers and dispatches the parsed request to the handler registered
//! for its method and path.

mod config;
mod connection;
mod error;
mod handler;
mod http_server;
mod response;
mod router;
mod tests;

// Re-export public items
pub use config::{ServerConfig, DEFAULT_WORKERS, PEEK_WINDOW};
pub use connection::{Connection, Outcome};
pub use error::Error;
pub use handler::HandlerFn;
pub use http_server::HttpServer;
pub use response::{HttpResponse, StatusCode};
pub use router::RouteTable;
