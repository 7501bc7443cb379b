//! Input validation for configuration and untrusted peer data
//!
//! Peer-supplied strings end up in logs and error messages, so they are
//! stripped of control characters and truncated before use.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::constants::MAX_LOGGED_INPUT_CHARS;

/// Regex for extension root URLs: scheme, non-empty host, bare "/" path
static BASE_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9+.-]*://[^/\s?#]+/$").unwrap());

/// Validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Validate an extension root URL
///
/// The root URL must be `scheme://host/` with nothing after the trailing
/// slash, since relative extension paths are appended to it verbatim.
///
/// # Examples
///
/// ```
/// use capture_relay_common::validation::validate_base_url;
///
/// assert!(validate_base_url("moz-extension://0b1c2d/").is_ok());
/// assert!(validate_base_url("moz-extension://0b1c2d").is_err()); // no trailing slash
/// ```
pub fn validate_base_url(url: &str) -> Result<(), ValidationError> {
    if !BASE_URL_REGEX.is_match(url) {
        return Err(ValidationError::InvalidBaseUrl(truncate_for_log(url)));
    }
    Ok(())
}

/// Limit untrusted input to the first characters worth echoing back
pub fn truncate_for_log(input: &str) -> String {
    input.chars().take(MAX_LOGGED_INPUT_CHARS).collect()
}

/// Remove control characters and truncate, for log lines
pub fn sanitize_for_log(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_LOGGED_INPUT_CHARS)
        .collect()
}
