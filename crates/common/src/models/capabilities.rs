use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::BROWSER_ACTION_PAGE;
use crate::error::RelayError;

/// Host API surfaces the background process may find available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiFeature {
    BrowserAction,
    BrowserActionPopup,
    ContextMenus,
    TabContextMenus,
    History,
    WebRequestBlocking,
    ExternalConnect,
}

impl ApiFeature {
    pub const ALL: [ApiFeature; 7] = [
        ApiFeature::BrowserAction,
        ApiFeature::BrowserActionPopup,
        ApiFeature::ContextMenus,
        ApiFeature::TabContextMenus,
        ApiFeature::History,
        ApiFeature::WebRequestBlocking,
        ApiFeature::ExternalConnect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BrowserAction => "browserAction",
            Self::BrowserActionPopup => "browserActionPopup",
            Self::ContextMenus => "contextMenus",
            Self::TabContextMenus => "tabContextMenus",
            Self::History => "history",
            Self::WebRequestBlocking => "webRequestBlocking",
            Self::ExternalConnect => "externalConnect",
        }
    }
}

impl FromStr for ApiFeature {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| RelayError::InvalidCapability(s.to_string()))
    }
}

/// How the toolbar button is served on this host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionFallback {
    /// The browser action shows its popup natively
    Popup,
    /// Only click events exist; open the action page in a new active tab
    OpenActionPage { url: String },
    /// No browser action at all; show the page action instead
    ShowPageAction,
}

/// Capability set probed once at startup and handed to components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeCapabilities {
    pub has_browser_action: bool,
    pub has_browser_action_popup: bool,
    pub has_context_menus: bool,
    pub has_tab_context_menus: bool,
    pub has_history: bool,
    pub has_web_request_blocking: bool,
    pub has_external_connect: bool,
}

impl RuntimeCapabilities {
    /// Every feature present
    pub fn all() -> Self {
        Self::probe(ApiFeature::ALL)
    }

    /// Build the set from the features the host reports
    pub fn probe<I>(features: I) -> Self
    where
        I: IntoIterator<Item = ApiFeature>,
    {
        let mut caps = Self::default();
        for feature in features {
            match feature {
                ApiFeature::BrowserAction => caps.has_browser_action = true,
                ApiFeature::BrowserActionPopup => caps.has_browser_action_popup = true,
                ApiFeature::ContextMenus => caps.has_context_menus = true,
                ApiFeature::TabContextMenus => caps.has_tab_context_menus = true,
                ApiFeature::History => caps.has_history = true,
                ApiFeature::WebRequestBlocking => caps.has_web_request_blocking = true,
                ApiFeature::ExternalConnect => caps.has_external_connect = true,
            }
        }
        caps
    }

    /// Parse a comma-separated feature list such as `"history,externalConnect"`
    pub fn parse_list(list: &str) -> Result<Self, RelayError> {
        let features = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ApiFeature::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::probe(features))
    }

    /// Features present in this set, in declaration order
    pub fn features(&self) -> Vec<ApiFeature> {
        ApiFeature::ALL
            .into_iter()
            .filter(|feature| match feature {
                ApiFeature::BrowserAction => self.has_browser_action,
                ApiFeature::BrowserActionPopup => self.has_browser_action_popup,
                ApiFeature::ContextMenus => self.has_context_menus,
                ApiFeature::TabContextMenus => self.has_tab_context_menus,
                ApiFeature::History => self.has_history,
                ApiFeature::WebRequestBlocking => self.has_web_request_blocking,
                ApiFeature::ExternalConnect => self.has_external_connect,
            })
            .collect()
    }

    /// Toolbar behaviour for this host, given the extension root URL
    pub fn action_fallback(&self, base_url: &str) -> ActionFallback {
        if !self.has_browser_action {
            ActionFallback::ShowPageAction
        } else if !self.has_browser_action_popup {
            ActionFallback::OpenActionPage {
                url: format!("{}{}", base_url, BROWSER_ACTION_PAGE),
            }
        } else {
            ActionFallback::Popup
        }
    }
}
