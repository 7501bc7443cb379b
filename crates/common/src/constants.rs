/// Header-name prefix marking a stand-in for a header page script may not set
pub const RESERVED_HEADER_PREFIX: &str = "X-WebScrapBook-";

/// Match pattern covering every URL scheme the network stack intercepts
pub const ALL_URLS_PATTERN: &str = "<all_urls>";

/// Error text reported when no internal context settles a broadcast
pub const NO_RECEIVER_MESSAGE: &str = "Could not establish connection. Receiving end does not exist.";

/// Page opened when the browser action has no popup support
pub const BROWSER_ACTION_PAGE: &str = "core/browserAction.html";

/// Capacity of the per-connection outgoing frame queue
pub const OUTGOING_CHANNEL_CAPACITY: usize = 100;

/// Capacity of each internal context's envelope queue
pub const CONTEXT_CHANNEL_CAPACITY: usize = 32;

/// Maximum number of characters of untrusted input echoed into logs
pub const MAX_LOGGED_INPUT_CHARS: usize = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_values() {
        const _: () = assert!(RESERVED_HEADER_PREFIX.len() == 15);
        const _: () = assert!(CONTEXT_CHANNEL_CAPACITY > 0);
        const _: () = assert!(MAX_LOGGED_INPUT_CHARS > 0);

        assert!(RESERVED_HEADER_PREFIX.ends_with('-'));
        assert!(!BROWSER_ACTION_PAGE.starts_with('/'));
    }
}
