use http::{HeaderMap, HeaderName};
use serde::{Deserialize, Serialize};

/// One entry of an outgoing request's ordered header list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewritableHeader {
    pub name: String,
    pub value: String,
}

impl RewritableHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Strip `prefix` from every header name that starts with it
///
/// Matching is case-sensitive. Values, order and length are preserved and
/// duplicate resulting names are left for the network stack to handle.
pub fn rewrite_reserved_headers(headers: &mut [RewritableHeader], prefix: &str) {
    for header in headers.iter_mut() {
        if let Some(stripped) = header.name.strip_prefix(prefix) {
            header.name = stripped.to_string();
        }
    }
}

/// [`rewrite_reserved_headers`] over an `http::HeaderMap`
///
/// Header maps store lowercase names, so `prefix` is compared lowercased.
/// A header whose stripped name is not a valid header name is kept as is.
pub fn rewrite_reserved_header_map(headers: &HeaderMap, prefix: &str) -> HeaderMap {
    let prefix = prefix.to_ascii_lowercase();
    let mut rewritten = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers.iter() {
        let target = name
            .as_str()
            .strip_prefix(prefix.as_str())
            .and_then(|stripped| HeaderName::from_bytes(stripped.as_bytes()).ok())
            .unwrap_or_else(|| name.clone());

        rewritten.append(target, value.clone());
    }

    rewritten
}
