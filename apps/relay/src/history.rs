use capture_relay_common::RuntimeCapabilities;
use tracing::debug;

/// Keeps the extension's own pages out of browsing history
#[derive(Debug, Clone)]
pub struct HistorySuppressor {
    base_url: String,
}

impl HistorySuppressor {
    /// `None` when the host has no history API
    pub fn new(capabilities: &RuntimeCapabilities, base_url: impl Into<String>) -> Option<Self> {
        capabilities.has_history.then(|| Self {
            base_url: base_url.into(),
        })
    }

    /// Whether a visit to `url` should be deleted from history
    pub fn should_delete(&self, url: &str) -> bool {
        let own_page = url.starts_with(&self.base_url);
        if own_page {
            debug!("Suppressing history entry for {}", url);
        }
        own_page
    }
}
