use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::context::BrowserContextId;
use super::window::WindowId;

/// Stable tab identifier. Assigned once when the contents are created and kept
/// across hide/show cycles and moves between windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Debugging-target id bound to exactly one content instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub String);

impl TargetId {
    /// Mints a fresh id in the devtools shape: 32 upper-case hex characters.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TargetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The two ways a caller may address a tab. Exactly one must be set; the
/// tab locator rejects anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSelector {
    #[serde(default)]
    pub target_id: Option<TargetId>,
    #[serde(default)]
    pub tab_id: Option<TabId>,
}

impl TabSelector {
    pub fn by_tab(tab_id: TabId) -> Self {
        Self {
            target_id: None,
            tab_id: Some(tab_id),
        }
    }

    pub fn by_target(target_id: impl Into<TargetId>) -> Self {
        Self {
            target_id: Some(target_id.into()),
            tab_id: None,
        }
    }
}

/// Describes a tab as returned by every tab command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub tab_id: TabId,
    pub target_id: TargetId,
    /// Absent while the tab sits in the hidden pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<WindowId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub url: String,
    pub title: String,
    pub is_active: bool,
    pub is_pinned: bool,
    pub is_loading: bool,
    pub load_progress: f64,
    pub is_hidden: bool,
    pub browser_context_id: BrowserContextId,
}
