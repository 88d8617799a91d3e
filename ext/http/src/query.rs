//! URL helpers.
//!
//! Splits a request target into its path and query string and reads query
//! parameters out of it.

/// Parse query string from a request target.
///
/// Returns the query string portion after '?' or None if no query string.
#[must_use]
pub fn parse_query_string(url: &str) -> Option<&str> {
    url.split_once('?').map(|(_, query)| query)
}

/// Parse path without query string.
///
/// Returns the path portion before '?' or the full target if no query string.
#[must_use]
pub fn parse_path_only(url: &str) -> &str {
    url.split_once('?').map_or(url, |(p, _)| p)
}

/// Get a query parameter value from a query string.
///
/// A bare key (`?debug`) yields an empty value. The first occurrence wins.
#[must_use]
pub fn get_query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then_some(value)
    })
}
