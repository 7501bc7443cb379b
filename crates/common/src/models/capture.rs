use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the capture should be stored as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    Source,
    Bookmark,
}

/// What to capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    /// A whole tab
    Tab(u64),
    /// A frame of a tab; frame 0 is the top-level document
    Frame { tab: u64, frame: u64 },
    /// An explicit URL, fetched independently of any tab
    Url(String),
}

/// Input of the capture entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDescriptor {
    pub target: CaptureTarget,
    pub mode: Option<CaptureMode>,
    /// Capture the whole frame (`true`) or only the selection (`false`)
    pub full: Option<bool>,
}

impl CaptureDescriptor {
    pub fn new(target: CaptureTarget) -> Self {
        Self {
            target,
            mode: None,
            full: None,
        }
    }

    pub fn tab(tab: u64) -> Self {
        Self::new(CaptureTarget::Tab(tab))
    }

    pub fn frame(tab: u64, frame: u64) -> Self {
        Self::new(CaptureTarget::Frame { tab, frame })
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::new(CaptureTarget::Url(url.into()))
    }

    pub fn with_mode(mut self, mode: CaptureMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_full(mut self, full: bool) -> Self {
        self.full = Some(full);
        self
    }

    /// Wire shape understood by the capturer
    ///
    /// Tabs and frames go under `target` as `"<tab>"` or `"<tab>:<frame>"`,
    /// URLs under `url`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        match &self.target {
            CaptureTarget::Tab(tab) => {
                map.insert("target".to_string(), Value::from(tab.to_string()));
            }
            CaptureTarget::Frame { tab, frame } => {
                map.insert("target".to_string(), Value::from(format!("{}:{}", tab, frame)));
            }
            CaptureTarget::Url(url) => {
                map.insert("url".to_string(), Value::from(url.clone()));
            }
        }
        if let Some(mode) = self.mode {
            map.insert("mode".to_string(), serde_json::json!(mode));
        }
        if let Some(full) = self.full {
            map.insert("full".to_string(), Value::from(full));
        }
        Value::Object(map)
    }
}
