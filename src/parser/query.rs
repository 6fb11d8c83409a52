//! Query string decoding.

use url::Url;

use crate::parser::error::Error;

const BASE: &str = "http://localhost";

/// Decode the query component of a request path into ordered name/value pairs.
///
/// Names and values are percent-decoded with form semantics (`+` is a space).
/// A path without a query yields no pairs.
///
/// # Examples
///
/// ```
/// use rawhttp_rs::parser::decode_query;
///
/// let pairs = decode_query("/search?q=hello+world&lang=en%2Dgb").unwrap();
/// assert_eq!(pairs, vec![
///     ("q".to_string(), "hello world".to_string()),
///     ("lang".to_string(), "en-gb".to_string()),
/// ]);
/// ```
pub fn decode_query(path: &str) -> Result<Vec<(String, String)>, Error> {
    let base = Url::parse(BASE)?;
    let uri = base.join(path)?;

    Ok(uri
        .query_pairs()
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect())
}
