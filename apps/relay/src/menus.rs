//! Context-menu capture entries
//!
//! Each entry maps the click info of one menu onto a capture descriptor.
//! Building and clicking menus never fails on its own; a click missing the
//! fields an entry needs simply produces no capture.

use anyhow::Result;
use capture_relay_common::{CaptureDescriptor, CaptureMode, RuntimeCapabilities};
use futures_util::future::BoxFuture;
use serde::Serialize;
use tracing::{debug, info};

/// Where a menu is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuContext {
    Tab,
    Page,
    Frame,
    Selection,
    Link,
    Image,
    Audio,
    Video,
}

/// Which URL the menu's patterns are matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlScope {
    /// URL of the document the menu is opened in
    Document,
    /// URL of the link or media element under the pointer
    Target,
}

/// What the host reports about a menu click
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickInfo {
    pub tab_id: Option<u64>,
    pub frame_id: Option<u64>,
    pub page_url: Option<String>,
    pub frame_url: Option<String>,
    pub link_url: Option<String>,
    pub src_url: Option<String>,
}

pub struct MenuEntry {
    pub id: &'static str,
    pub title_key: &'static str,
    pub contexts: &'static [MenuContext],
    pub scope: UrlScope,
    build: fn(&ClickInfo) -> Option<CaptureDescriptor>,
}

impl MenuEntry {
    pub fn descriptor(&self, info: &ClickInfo) -> Option<CaptureDescriptor> {
        (self.build)(info)
    }

    fn is_tab_entry(&self) -> bool {
        self.contexts.contains(&MenuContext::Tab)
    }
}

fn tab_target(info: &ClickInfo) -> Option<CaptureDescriptor> {
    info.tab_id.map(CaptureDescriptor::tab)
}

fn page_url(info: &ClickInfo) -> Option<CaptureDescriptor> {
    info.page_url.as_deref().map(CaptureDescriptor::url)
}

fn frame_url(info: &ClickInfo) -> Option<CaptureDescriptor> {
    info.frame_url.as_deref().map(CaptureDescriptor::url)
}

fn link_url(info: &ClickInfo) -> Option<CaptureDescriptor> {
    info.link_url.as_deref().map(CaptureDescriptor::url)
}

fn current_frame(info: &ClickInfo) -> Option<CaptureDescriptor> {
    Some(CaptureDescriptor::frame(info.tab_id?, info.frame_id?))
}

pub static MENU_ENTRIES: &[MenuEntry] = &[
    MenuEntry {
        id: "captureTab",
        title_key: "CaptureTab",
        contexts: &[MenuContext::Tab],
        scope: UrlScope::Document,
        build: tab_target,
    },
    MenuEntry {
        id: "captureTabSource",
        title_key: "CaptureTabSource",
        contexts: &[MenuContext::Tab],
        scope: UrlScope::Document,
        build: |info| tab_target(info).map(|d| d.with_mode(CaptureMode::Source)),
    },
    MenuEntry {
        id: "captureTabBookmark",
        title_key: "CaptureTabBookmark",
        contexts: &[MenuContext::Tab],
        scope: UrlScope::Document,
        build: |info| tab_target(info).map(|d| d.with_mode(CaptureMode::Bookmark)),
    },
    MenuEntry {
        id: "capturePage",
        title_key: "CapturePage",
        contexts: &[MenuContext::Page],
        scope: UrlScope::Document,
        build: |info| {
            info.tab_id
                .map(|tab| CaptureDescriptor::frame(tab, 0).with_full(true))
        },
    },
    MenuEntry {
        id: "capturePageSource",
        title_key: "CapturePageSource",
        contexts: &[MenuContext::Page],
        scope: UrlScope::Document,
        build: |info| page_url(info).map(|d| d.with_mode(CaptureMode::Source)),
    },
    MenuEntry {
        id: "capturePageBookmark",
        title_key: "CapturePageBookmark",
        contexts: &[MenuContext::Page],
        scope: UrlScope::Document,
        build: |info| page_url(info).map(|d| d.with_mode(CaptureMode::Bookmark)),
    },
    MenuEntry {
        id: "captureFrame",
        title_key: "CaptureFrame",
        contexts: &[MenuContext::Frame],
        scope: UrlScope::Document,
        build: |info| current_frame(info).map(|d| d.with_full(true)),
    },
    MenuEntry {
        id: "captureFrameSource",
        title_key: "CaptureFrameSource",
        contexts: &[MenuContext::Frame],
        scope: UrlScope::Document,
        build: |info| frame_url(info).map(|d| d.with_mode(CaptureMode::Source)),
    },
    MenuEntry {
        id: "captureFrameBookmark",
        title_key: "CaptureFrameBookmark",
        contexts: &[MenuContext::Frame],
        scope: UrlScope::Document,
        build: |info| frame_url(info).map(|d| d.with_mode(CaptureMode::Bookmark)),
    },
    MenuEntry {
        id: "captureSelection",
        title_key: "CaptureSelection",
        contexts: &[MenuContext::Selection],
        scope: UrlScope::Document,
        build: |info| current_frame(info).map(|d| d.with_full(false)),
    },
    MenuEntry {
        id: "captureLinkSource",
        title_key: "CaptureLinkSource",
        contexts: &[MenuContext::Link],
        scope: UrlScope::Target,
        build: link_url,
    },
    MenuEntry {
        id: "captureLinkBookmark",
        title_key: "CaptureLinkBookmark",
        contexts: &[MenuContext::Link],
        scope: UrlScope::Target,
        build: |info| link_url(info).map(|d| d.with_mode(CaptureMode::Bookmark)),
    },
    MenuEntry {
        id: "captureMedia",
        title_key: "CaptureMedia",
        contexts: &[MenuContext::Image, MenuContext::Audio, MenuContext::Video],
        scope: UrlScope::Target,
        build: |info| info.src_url.as_deref().map(CaptureDescriptor::url),
    },
];

/// Resolves message keys into display strings
pub trait Localizer: Send + Sync {
    fn lang(&self, key: &str) -> String;
}

/// The capture pipeline's entry point
pub trait CaptureInvoker: Send + Sync {
    fn invoke_capture(&self, descriptor: CaptureDescriptor) -> BoxFuture<'_, Result<()>>;
}

/// A menu ready to be registered with the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: &'static str,
    pub title: String,
    pub contexts: Vec<MenuContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url_patterns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url_patterns: Option<Vec<String>>,
}

/// Menus to register on this host
///
/// Empty without context-menu support; tab menus need their own capability.
pub fn build_menu_items(
    capabilities: &RuntimeCapabilities,
    localizer: &dyn Localizer,
    url_patterns: &[String],
) -> Vec<MenuItem> {
    if !capabilities.has_context_menus {
        debug!("Context menus unavailable, skipping menu registration");
        return Vec::new();
    }

    MENU_ENTRIES
        .iter()
        .filter(|entry| capabilities.has_tab_context_menus || !entry.is_tab_entry())
        .map(|entry| {
            let patterns = Some(url_patterns.to_vec());
            let (document_url_patterns, target_url_patterns) = match entry.scope {
                UrlScope::Document => (patterns, None),
                UrlScope::Target => (None, patterns),
            };
            MenuItem {
                id: entry.id,
                title: localizer.lang(entry.title_key),
                contexts: entry.contexts.to_vec(),
                document_url_patterns,
                target_url_patterns,
            }
        })
        .collect()
}

/// Descriptor for a click on the menu with the given id
pub fn descriptor_for(menu_id: &str, info: &ClickInfo) -> Option<CaptureDescriptor> {
    MENU_ENTRIES
        .iter()
        .find(|entry| entry.id == menu_id)
        .and_then(|entry| entry.descriptor(info))
}

/// Invoke the capture for a menu click
///
/// Returns `Ok(false)` when the click does not resolve to a capture.
pub async fn handle_click(
    invoker: &dyn CaptureInvoker,
    menu_id: &str,
    info: &ClickInfo,
) -> Result<bool> {
    let Some(descriptor) = descriptor_for(menu_id, info) else {
        debug!("Menu click {} produced no capture", menu_id);
        return Ok(false);
    };

    info!("Menu {} invoking capture: {}", menu_id, descriptor.to_json());
    invoker.invoke_capture(descriptor).await?;
    Ok(true)
}
