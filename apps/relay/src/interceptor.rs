//! Outgoing request header rewriting
//!
//! Page script cannot set some headers (e.g. `Referer`) directly. It sets
//! `X-WebScrapBook-<Name>` instead and this hook renames the header before
//! the request leaves the process. The hook is synchronous and infallible.

use capture_relay_common::constants::RESERVED_HEADER_PREFIX;
use capture_relay_common::utils::rewrite_reserved_header_map;
use capture_relay_common::{RequestFilter, ResourceType, RewritableHeader, rewrite_reserved_headers};
use http::HeaderMap;

/// What the network stack hands the hook for one request
#[derive(Debug, Clone)]
pub struct RequestDetails {
    pub url: String,
    pub resource_type: ResourceType,
    pub request_headers: Vec<RewritableHeader>,
}

/// Replacement header list returned to the network stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockingResponse {
    pub request_headers: Vec<RewritableHeader>,
}

/// Renames reserved-prefix headers on requests matching its filter
#[derive(Debug, Clone)]
pub struct HeaderRewriteInterceptor {
    prefix: String,
    filter: RequestFilter,
}

impl Default for HeaderRewriteInterceptor {
    fn default() -> Self {
        Self::new(RequestFilter::default())
    }
}

impl HeaderRewriteInterceptor {
    pub fn new(filter: RequestFilter) -> Self {
        Self {
            prefix: RESERVED_HEADER_PREFIX.to_string(),
            filter,
        }
    }

    pub fn filter(&self) -> &RequestFilter {
        &self.filter
    }

    /// Whether the network stack should invoke the hook for this request
    pub fn applies_to(&self, url: &str, resource_type: ResourceType) -> bool {
        self.filter.matches(url, resource_type)
    }

    /// The hook body: rewrite the header list and hand it back
    pub fn on_before_send_headers(&self, details: RequestDetails) -> BlockingResponse {
        let mut request_headers = details.request_headers;
        rewrite_reserved_headers(&mut request_headers, &self.prefix);
        BlockingResponse { request_headers }
    }

    /// Rewrite an `http::HeaderMap` in place when the filter matches
    ///
    /// Returns whether the hook ran.
    pub fn apply_to_headers(
        &self,
        url: &str,
        resource_type: ResourceType,
        headers: &mut HeaderMap,
    ) -> bool {
        if !self.applies_to(url, resource_type) {
            return false;
        }
        *headers = rewrite_reserved_header_map(headers, &self.prefix);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn details(headers: &[(&str, &str)]) -> RequestDetails {
        RequestDetails {
            url: "https://example.com/image.png".to_string(),
            resource_type: ResourceType::XmlHttpRequest,
            request_headers: headers
                .iter()
                .map(|(n, v)| RewritableHeader::new(*n, *v))
                .collect(),
        }
    }

    #[test]
    fn test_on_before_send_headers() {
        let interceptor = HeaderRewriteInterceptor::default();

        let response = interceptor.on_before_send_headers(details(&[
            ("Accept", "*/*"),
            ("X-WebScrapBook-Referer", "http://x"),
        ]));

        assert_eq!(
            response.request_headers,
            vec![
                RewritableHeader::new("Accept", "*/*"),
                RewritableHeader::new("Referer", "http://x"),
            ]
        );
    }

    #[test]
    fn test_empty_header_list() {
        let interceptor = HeaderRewriteInterceptor::default();
        let response = interceptor.on_before_send_headers(details(&[]));
        assert!(response.request_headers.is_empty());
    }

    #[test]
    fn test_applies_to_default_scope() {
        let interceptor = HeaderRewriteInterceptor::default();

        assert!(interceptor.applies_to("http://example.com/", ResourceType::XmlHttpRequest));
        assert!(!interceptor.applies_to("http://example.com/", ResourceType::MainFrame));
        assert!(!interceptor.applies_to("about:blank", ResourceType::XmlHttpRequest));
    }

    #[test]
    fn test_apply_to_headers() {
        let interceptor = HeaderRewriteInterceptor::default();
        let mut headers = HeaderMap::new();
        headers.insert("x-webscrapbook-referer", HeaderValue::from_static("http://x"));

        let ran = interceptor.apply_to_headers(
            "https://example.com/a",
            ResourceType::XmlHttpRequest,
            &mut headers,
        );

        assert!(ran);
        assert_eq!(headers.get("referer").unwrap(), "http://x");
    }

    #[test]
    fn test_apply_to_headers_outside_scope() {
        let interceptor = HeaderRewriteInterceptor::default();
        let mut headers = HeaderMap::new();
        headers.insert("x-webscrapbook-referer", HeaderValue::from_static("http://x"));

        let ran = interceptor.apply_to_headers(
            "https://example.com/a",
            ResourceType::Image,
            &mut headers,
        );

        assert!(!ran);
        assert!(headers.get("referer").is_none());
        assert_eq!(headers.get("x-webscrapbook-referer").unwrap(), "http://x");
    }
}
