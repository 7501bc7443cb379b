//! HTTP client whose outgoing requests pass through the header interceptor

use anyhow::{Context, Result};
use capture_relay_common::{ResourceType, RewritableHeader, RuntimeCapabilities};
use reqwest::{Client, Request};
use tracing::debug;

use crate::interceptor::HeaderRewriteInterceptor;

/// `reqwest::Client` with the header rewrite hook installed
#[derive(Debug, Clone)]
pub struct InterceptingClient {
    client: Client,
    interceptor: Option<HeaderRewriteInterceptor>,
}

impl InterceptingClient {
    /// Install `interceptor` if the host supports blocking request hooks
    pub fn new(
        client: Client,
        capabilities: &RuntimeCapabilities,
        interceptor: HeaderRewriteInterceptor,
    ) -> Self {
        Self {
            client,
            interceptor: capabilities
                .has_web_request_blocking
                .then_some(interceptor),
        }
    }

    pub fn is_intercepting(&self) -> bool {
        self.interceptor.is_some()
    }

    /// Run the hook on a built request
    pub fn prepare(&self, mut request: Request, resource_type: ResourceType) -> Request {
        if let Some(interceptor) = &self.interceptor {
            let url = request.url().to_string();
            if interceptor.apply_to_headers(&url, resource_type, request.headers_mut()) {
                debug!("Rewrote reserved headers for {}", url);
            }
        }
        request
    }

    /// Build a programmatic GET carrying `headers`, hook already applied
    pub fn build_fetch(&self, url: &str, headers: &[RewritableHeader]) -> Result<Request> {
        let mut builder = self.client.get(url);
        for header in headers {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }
        let request = builder
            .build()
            .with_context(|| format!("Invalid fetch request for {}", url))?;
        Ok(self.prepare(request, ResourceType::XmlHttpRequest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture_relay_common::ApiFeature;

    fn client(capabilities: RuntimeCapabilities) -> InterceptingClient {
        InterceptingClient::new(
            Client::new(),
            &capabilities,
            HeaderRewriteInterceptor::default(),
        )
    }

    #[test]
    fn test_build_fetch_rewrites_reserved_headers() {
        let client = client(RuntimeCapabilities::all());
        assert!(client.is_intercepting());

        let request = client
            .build_fetch(
                "https://example.com/page.html",
                &[
                    RewritableHeader::new("X-WebScrapBook-Referer", "https://example.com/"),
                    RewritableHeader::new("Accept", "*/*"),
                ],
            )
            .unwrap();

        let headers = request.headers();
        assert_eq!(headers.get("referer").unwrap(), "https://example.com/");
        assert_eq!(headers.get("accept").unwrap(), "*/*");
        assert!(headers.get("x-webscrapbook-referer").is_none());
    }

    #[test]
    fn test_no_rewrite_without_blocking_support() {
        let client = client(RuntimeCapabilities::probe([ApiFeature::ExternalConnect]));
        assert!(!client.is_intercepting());

        let request = client
            .build_fetch(
                "https://example.com/",
                &[RewritableHeader::new("X-WebScrapBook-Referer", "https://a/")],
            )
            .unwrap();

        assert!(request.headers().get("referer").is_none());
        assert!(request.headers().get("x-webscrapbook-referer").is_some());
    }

    #[test]
    fn test_prepare_respects_resource_type() {
        let client = client(RuntimeCapabilities::all());
        let request = Client::new()
            .get("https://example.com/")
            .header("X-WebScrapBook-Referer", "https://a/")
            .build()
            .unwrap();

        let request = client.prepare(request, ResourceType::MainFrame);
        assert!(request.headers().get("referer").is_none());
    }

    #[test]
    fn test_build_fetch_rejects_bad_url() {
        let client = client(RuntimeCapabilities::all());
        assert!(client.build_fetch("not a url", &[]).is_err());
    }
}
