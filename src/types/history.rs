use serde::{Deserialize, Serialize};

use super::tab::TabId;
use super::window::WindowId;

/// A tab that was closed while attached to a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedTabEntry {
    pub id: i64,
    pub tab_id: TabId,
    pub window_id: WindowId,
    pub index: usize,
    pub url: String,
    pub title: String,
    pub pinned: bool,
    /// Unix timestamp, seconds.
    pub closed_at: i64,
}

/// Current time as unix seconds.
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
