//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};

use serde::Deserialize;

use crate::server::error::Error;

/// Number of connections served at the same time.
pub const DEFAULT_WORKERS: usize = 64;

/// Request line and headers must fit in this many bytes.
///
/// A header block that is not terminated within the window is rejected with
/// `400 Bad Request`.
pub const PEEK_WINDOW: usize = 4096;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The number of worker threads serving connections.
    pub workers: usize,
    /// The capacity of the window the request head is read into.
    pub peek_window: usize,
}

impl ServerConfig {
    /// Load a configuration from a JSON document. Missing fields take their
    /// default values.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            workers: DEFAULT_WORKERS,
            peek_window: PEEK_WINDOW,
        }
    }
}
