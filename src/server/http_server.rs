//! HTTP server implementation.

use std::io::{self, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};

use log::{debug, error, info};
use tokio::runtime::{Builder, Runtime};

use crate::parser::Request;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::server::error::Error;
use crate::server::router::RouteTable;

/// An HTTP server.
///
/// Each accepted connection is served synchronously on one of
/// [`ServerConfig::workers`] blocking worker threads. Connections accepted while
/// every worker is busy wait in an unbounded queue.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The routes.
    pub routes: RouteTable,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and an empty route
    /// table.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_routes(config, RouteTable::new())
    }

    /// Create a server that dispatches through an existing route table.
    pub fn with_routes(config: ServerConfig, routes: RouteTable) -> Self {
        Self { config, routes }
    }

    /// Register a handler for an exact method and path.
    pub fn add_handler<F>(&self, method: impl Into<String>, path: impl Into<String>, handler: F)
    where
        F: Fn(&Request, &mut dyn Write) -> io::Result<()> + Send + Sync + 'static,
    {
        self.routes.add_handler(method, path, handler);
    }

    /// Bind `0.0.0.0:port` and serve connections until accepting fails.
    ///
    /// Blocks the calling thread.
    pub fn listen(&self, port: u16) -> Result<(), Error> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        self.bind_and_serve(addr)
    }

    /// Bind the configured address and serve connections until accepting fails.
    pub fn start(&self) -> Result<(), Error> {
        self.bind_and_serve(self.config.addr)
    }

    /// Serve connections from an already bound listener until accepting fails.
    pub fn serve(&self, listener: TcpListener) -> Result<(), Error> {
        let workers = self.worker_pool()?;
        self.display_server_info(&listener);

        loop {
            match listener.accept() {
                Ok((stream, peer)) => self.hand_off(&workers, stream, peer),
                Err(e) => {
                    error!("Error accepting connection: {e}");
                    workers.shutdown_background();
                    return Err(e.into());
                }
            }
        }
    }

    fn bind_and_serve(&self, addr: SocketAddr) -> Result<(), Error> {
        let listener = TcpListener::bind(addr).map_err(|e| {
            error!("Failed to bind {addr}: {e}");
            e
        })?;
        self.serve(listener)
    }

    /// Build the pool of blocking workers connections are handed to.
    fn worker_pool(&self) -> Result<Runtime, Error> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(self.config.workers.max(1))
            .thread_name("rawhttp-worker")
            .build()?;
        Ok(runtime)
    }

    fn hand_off(&self, workers: &Runtime, stream: TcpStream, peer: SocketAddr) {
        let routes = self.routes.clone();
        let peek_window = self.config.peek_window;

        workers.spawn_blocking(move || {
            // Dropping the stream on return closes the socket.
            match Connection::new(stream, Some(peer), peek_window).run_guarded(&routes) {
                Ok(outcome) => debug!("Connection from {peer} closed: {outcome:?}"),
                Err(e) => error!("Error handling connection from {peer}: {e}"),
            }
        });
    }

    /// Log the listening address and registered endpoints.
    fn display_server_info(&self, listener: &TcpListener) {
        match listener.local_addr() {
            Ok(addr) => info!("Server listening on http://{addr}"),
            Err(e) => error!("Server listening on an unknown address: {e}"),
        }

        info!("Registered endpoints:");
        for (method, path) in self.routes.routes() {
            info!("  {method} {path}");
        }
    }
}
