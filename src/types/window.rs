use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::BrowserContextId;
use super::errors::CommandError;
use super::tab::TabId;

/// Window identifier, unique among live windows and never reused while live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub i32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowType {
    #[default]
    Normal,
    Popup,
    App,
    AppPopup,
    PictureInPicture,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
}

/// Window geometry plus show state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowBounds {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub window_state: WindowState,
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self {
            left: 0,
            top: 0,
            width: 1280,
            height: 800,
            window_state: WindowState::Normal,
        }
    }
}

/// Partial bounds as supplied by a caller. Unset fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsUpdate {
    #[serde(default)]
    pub left: Option<i32>,
    #[serde(default)]
    pub top: Option<i32>,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    #[serde(default)]
    pub window_state: Option<WindowState>,
}

impl BoundsUpdate {
    fn has_geometry(&self) -> bool {
        self.left.is_some() || self.top.is_some() || self.width.is_some() || self.height.is_some()
    }

    pub fn validate(&self) -> Result<(), CommandError> {
        if matches!(self.width, Some(w) if w <= 0) {
            return Err(CommandError::InvalidParams(
                "width must be positive".to_string(),
            ));
        }
        if matches!(self.height, Some(h) if h <= 0) {
            return Err(CommandError::InvalidParams(
                "height must be positive".to_string(),
            ));
        }
        match self.window_state {
            Some(state) if state != WindowState::Normal && self.has_geometry() => {
                Err(CommandError::InvalidParams(
                    "minimized, maximized and fullscreen states cannot be combined with left, top, width or height"
                        .to_string(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Applies the set fields on top of `base`.
    pub fn apply_to(&self, base: &WindowBounds) -> WindowBounds {
        WindowBounds {
            left: self.left.unwrap_or(base.left),
            top: self.top.unwrap_or(base.top),
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            window_state: self.window_state.unwrap_or(base.window_state),
        }
    }
}

/// Describes a window as returned by the window commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    pub window_id: WindowId,
    pub window_type: WindowType,
    pub bounds: WindowBounds,
    pub is_active: bool,
    pub is_visible: bool,
    pub tab_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_tab_id: Option<TabId>,
    pub browser_context_id: BrowserContextId,
}
