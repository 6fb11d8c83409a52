//! Per-connection request handling.

use std::fmt;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, warn};

use crate::parser::{index_of, parse_request_traced, Stage, CRLF_CRLF};
use crate::server::error::Error;
use crate::server::response::{HttpResponse, StatusCode};
use crate::server::router::RouteTable;

/// How a connection ended. The connection is closed in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A handler wrote the response.
    Responded,
    /// The request was malformed and `400 Bad Request` was sent.
    BadRequest,
    /// No handler matched and `404 Not Found` was sent.
    NotFound,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Accepted,
    Parsing(Stage),
    Routed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Parsing(stage) => write!(f, "{stage}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// A single accepted connection.
///
/// The stream is read once for the request head, once more for any body bytes
/// that did not fit, and then written with exactly one response.
pub struct Connection<S> {
    stream: S,
    peer: Option<SocketAddr>,
    peek_window: usize,
}

impl<S: Read + Write> Connection<S> {
    /// Wrap an accepted stream. `peek_window` bounds the request line and header
    /// block.
    pub fn new(stream: S, peer: Option<SocketAddr>, peek_window: usize) -> Self {
        Self {
            stream,
            peer,
            peek_window,
        }
    }

    /// Parse one request, dispatch it and write the response.
    ///
    /// Malformed requests and route misses are answered here and reported through
    /// the returned [`Outcome`]. Any other failure is returned as an error without
    /// anything having been written.
    pub fn run(mut self, routes: &RouteTable) -> Result<Outcome, Error> {
        let buffered = self.read_head()?;

        let peer = self.peer_name();
        let parsed = parse_request_traced(&buffered, &mut self.stream, |stage| {
            Self::log_state(&peer, State::Parsing(stage));
        });
        let request = match parsed {
            Ok(request) => request,
            Err(e) if e.is_malformed() => {
                debug!("Bad request from {peer}: {e}");
                self.respond(StatusCode::BadRequest)?;
                return Ok(Outcome::BadRequest);
            }
            Err(e) => return Err(e.into()),
        };

        let handler = match routes.dispatch(request.method(), request.path()) {
            Ok(handler) => handler,
            Err(Error::NotFound { method, path }) => {
                warn!("No handler for {method} {path}");
                self.respond(StatusCode::NotFound)?;
                return Ok(Outcome::NotFound);
            }
            Err(e) => return Err(e),
        };
        self.transition(State::Routed);

        {
            let mut out = BufWriter::new(&mut self.stream);
            (handler)(&request, &mut out)?;
            out.flush()?;
        }

        debug!("Responded to {} from {}", request.request_line(), self.peer_name());
        Ok(Outcome::Responded)
    }

    /// Like [`Connection::run`], but a panicking handler is caught and reported as
    /// [`Error::HandlerPanic`] instead of unwinding into the worker.
    pub fn run_guarded(self, routes: &RouteTable) -> Result<Outcome, Error> {
        panic::catch_unwind(AssertUnwindSafe(|| self.run(routes))).unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "<non-string panic payload>".to_string());
            Err(Error::HandlerPanic(message))
        })
    }

    /// Read until the header terminator is buffered, the window is full or the
    /// peer stops sending.
    fn read_head(&mut self) -> Result<Vec<u8>, Error> {
        let mut buffer = vec![0; self.peek_window];
        let mut read = 0;
        self.transition(State::Accepted);

        while read < buffer.len() {
            let n = match self.stream.read(&mut buffer[read..]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            // The terminator may straddle the previous read.
            let scan_from = read.saturating_sub(CRLF_CRLF.len() - 1);
            read += n;
            if index_of(&buffer, CRLF_CRLF, scan_from, read).is_some() {
                break;
            }
        }

        buffer.truncate(read);
        Ok(buffer)
    }

    fn respond(&mut self, status: StatusCode) -> Result<(), Error> {
        let mut out = BufWriter::new(&mut self.stream);
        HttpResponse::empty(status).write_to(&mut out)?;
        Ok(())
    }

    fn transition(&self, state: State) {
        Self::log_state(&self.peer_name(), state);
    }

    fn log_state(peer: &str, state: State) {
        debug!("Connection {peer}: {state}");
    }

    fn peer_name(&self) -> String {
        self.peer.map_or_else(|| "<unknown>".to_string(), |peer| peer.to_string())
    }
}
