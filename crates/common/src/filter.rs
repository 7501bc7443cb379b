//! Request filters for the network interception hook
//!
//! A filter pairs WebExtension-style URL match patterns with a set of
//! resource types. The interception hook only runs for requests that match
//! both.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::ALL_URLS_PATTERN;
use crate::error::{RelayError, Result};

/// Splits a match pattern into scheme, host and path
static PATTERN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\*|[a-z][a-z0-9+.-]*)://(\*|\*\.[^/*]+|[^/*]*)(/.*)$").unwrap()
});

/// Schemes covered by `<all_urls>`
static ALL_URLS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:https?|wss?|ftp|file|data):").unwrap());

/// Kind of resource an outgoing request loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    MainFrame,
    SubFrame,
    Stylesheet,
    Script,
    Image,
    Font,
    Object,
    #[serde(rename = "xmlhttprequest")]
    XmlHttpRequest,
    Ping,
    Media,
    Websocket,
    Other,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainFrame => "main_frame",
            Self::SubFrame => "sub_frame",
            Self::Stylesheet => "stylesheet",
            Self::Script => "script",
            Self::Image => "image",
            Self::Font => "font",
            Self::Object => "object",
            Self::XmlHttpRequest => "xmlhttprequest",
            Self::Ping => "ping",
            Self::Media => "media",
            Self::Websocket => "websocket",
            Self::Other => "other",
        }
    }
}

impl FromStr for ResourceType {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(serde_json::Value::from(s))
            .map_err(|_| RelayError::InvalidPattern(format!("unknown resource type: {}", s)))
    }
}

/// A compiled URL match pattern
#[derive(Debug, Clone)]
pub struct MatchPattern {
    source: String,
    regex: Regex,
}

impl MatchPattern {
    /// The `<all_urls>` pattern
    pub fn all_urls() -> Self {
        Self {
            source: ALL_URLS_PATTERN.to_string(),
            regex: Regex::clone(&ALL_URLS_REGEX),
        }
    }

    /// Compile `scheme://host/path` or `<all_urls>`
    ///
    /// A `*` scheme covers http, https, ws and wss. A `*` host covers any
    /// host and `*.example.com` covers the domain and its subdomains. `*` in
    /// the path matches any run of characters, query included. Ports are
    /// ignored when matching.
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern == ALL_URLS_PATTERN {
            return Ok(Self::all_urls());
        }

        let caps = PATTERN_REGEX
            .captures(pattern)
            .ok_or_else(|| RelayError::InvalidPattern(pattern.to_string()))?;

        let scheme = match &caps[1] {
            "*" => "(?:https?|wss?)".to_string(),
            other => regex::escape(other),
        };

        let host = match &caps[2] {
            "*" => "[^/]*".to_string(),
            h if h.starts_with("*.") => format!(r"(?:[^/]*\.)?{}", regex::escape(&h[2..])),
            h => regex::escape(h),
        };

        let path = caps[3]
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = Regex::new(&format!(r"^{}://{}(?::\d+)?{}$", scheme, host, path))
            .map_err(|e| RelayError::InvalidPattern(format!("{}: {}", pattern, e)))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}

/// URL scope and resource types an interception hook is registered for
#[derive(Debug, Clone)]
pub struct RequestFilter {
    patterns: Vec<MatchPattern>,
    types: Vec<ResourceType>,
}

impl RequestFilter {
    /// Build a filter; an empty type list matches every resource type
    pub fn new<S: AsRef<str>>(patterns: &[S], types: Vec<ResourceType>) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| MatchPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns, types })
    }

    pub fn matches(&self, url: &str, resource_type: ResourceType) -> bool {
        let type_ok = self.types.is_empty() || self.types.contains(&resource_type);
        type_ok && self.patterns.iter().any(|p| p.matches(url))
    }

    pub fn patterns(&self) -> &[MatchPattern] {
        &self.patterns
    }

    pub fn types(&self) -> &[ResourceType] {
        &self.types
    }
}

impl Default for RequestFilter {
    /// Every URL, programmatic HTTP requests only
    fn default() -> Self {
        Self {
            patterns: vec![MatchPattern::all_urls()],
            types: vec![ResourceType::XmlHttpRequest],
        }
    }
}
