//! Route table mapping an exact (method, path) pair to its handler.

use std::io::{self, Write};
use std::sync::Arc;

use dashmap::DashMap;

use crate::parser::Request;
use crate::server::error::Error;
use crate::server::handler::HandlerFn;

/// Concurrent two-level map from method to path to handler.
///
/// Cloning a `RouteTable` yields another handle to the same routes, so a table can
/// be filled by setup code and shared with every connection worker.
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: Arc<DashMap<String, DashMap<String, HandlerFn>>>,
}

impl RouteTable {
    /// Create an empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for requests with exactly this method and path.
    ///
    /// Registering the same pair again replaces the previous handler.
    pub fn add_handler<F>(&self, method: impl Into<String>, path: impl Into<String>, handler: F)
    where
        F: Fn(&Request, &mut dyn Write) -> io::Result<()> + Send + Sync + 'static,
    {
        self.add_shared(method, path, Arc::new(handler));
    }

    /// Register an already shared handler.
    pub fn add_shared(&self, method: impl Into<String>, path: impl Into<String>, handler: HandlerFn) {
        self.routes
            .entry(method.into())
            .or_default()
            .insert(path.into(), handler);
    }

    /// Look up the handler for a method and path. Both must match exactly.
    pub fn dispatch(&self, method: &str, path: &str) -> Result<HandlerFn, Error> {
        self.routes
            .get(method)
            .and_then(|paths| paths.get(path).map(|handler| Arc::clone(handler.value())))
            .ok_or_else(|| Error::NotFound {
                method: method.to_string(),
                path: path.to_string(),
            })
    }

    /// All registered (method, path) pairs, sorted.
    pub fn routes(&self) -> Vec<(String, String)> {
        let mut routes: Vec<(String, String)> = self
            .routes
            .iter()
            .flat_map(|paths| {
                let method = paths.key().clone();
                paths
                    .value()
                    .iter()
                    .map(|entry| (method.clone(), entry.key().clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        routes.sort();
        routes
    }

    /// The number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.iter().map(|paths| paths.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable").field("routes", &self.routes()).finish()
    }
}
