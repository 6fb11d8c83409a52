//! HTTP request handlers.

use std::io::{self, Write};
use std::sync::Arc;

use crate::parser::Request;

/// A handler receives the parsed request and writes the whole response to the
/// output sink.
pub type HandlerFn = Arc<dyn Fn(&Request, &mut dyn Write) -> io::Result<()> + Send + Sync>;
