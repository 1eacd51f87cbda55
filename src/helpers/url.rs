//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except RFC 3986 unreserved characters (`A-Z a-z 0-9 - . _ ~`)
const STRICT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encode a single path segment, including any `/`
///
/// # Examples
/// ```ignore
/// encode_segment("a b/c") // -> "a%20b%2Fc"
/// ```
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, STRICT).to_string()
}

/// Encode a path segment by segment, keeping the `/` separators
///
/// # Examples
/// ```ignore
/// encode_path("blogs/2024-01-05-café.md") // -> "blogs/2024-01-05-caf%C3%A9.md"
/// ```
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a base URL and a path with exactly one `/` between them
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
