//! Query-string parsing.
//!
//! The format is `key=value&key2=value2`. The rules are fixed and
//! documented rather than configurable:
//!
//! - pairs are split on `&`, then on `=`
//! - a pair without `=` is silently dropped
//! - a pair with more than one `=` keeps only the piece after the first
//!   one, so `a=b=c` yields `b`
//! - when a key repeats, [`parse_query`] resolves to the **last**
//!   occurrence (left-to-right iteration, later overwrites earlier), while
//!   the single-key [`query_param`] stops at the **first**
//!
//! Parsing never mutates its input; parsing the same string twice yields
//! the same result.

use std::collections::HashMap;

/// Parses a full query string into a key → value map.
///
/// # Example
///
/// ```
/// use skiff_http::query::parse_query;
///
/// let params = parse_query("key=test&value=bbp");
/// assert_eq!(params["key"], "test");
/// assert_eq!(params["value"], "bbp");
/// ```
#[must_use]
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&') {
        if !pair.contains('=') {
            continue;
        }
        let mut pieces = pair.split('=');
        let key = pieces.next().unwrap_or("");
        let value = pieces.next().unwrap_or("");
        params.insert(key.to_string(), value.to_string());
    }
    params
}

/// Returns the value of a single key, or `None` when it is absent.
///
/// Stops at the first occurrence of the key.
#[must_use]
pub fn query_param<'q>(query: &'q str, name: &str) -> Option<&'q str> {
    for pair in query.split('&') {
        if !pair.contains('=') {
            continue;
        }
        let mut pieces = pair.split('=');
        if pieces.next() == Some(name) {
            return Some(pieces.next().unwrap_or(""));
        }
    }
    None
}
