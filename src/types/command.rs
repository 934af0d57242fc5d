use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::context::BrowserContextId;
use super::errors::CommandError;
use super::tab::{TabId, TabInfo, TabSelector, TargetId};
use super::window::{BoundsUpdate, WindowBounds, WindowId, WindowInfo, WindowType};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWindowParams {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub bounds: Option<BoundsUpdate>,
    #[serde(default)]
    pub window_type: Option<WindowType>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub browser_context_id: Option<BrowserContextId>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTabsParams {
    #[serde(default)]
    pub window_id: Option<WindowId>,
    #[serde(default)]
    pub include_hidden: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTabParams {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub window_id: Option<WindowId>,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub background: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub browser_context_id: Option<BrowserContextId>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTabParams {
    #[serde(flatten)]
    pub selector: TabSelector,
    #[serde(default)]
    pub window_id: Option<WindowId>,
    #[serde(default)]
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowTabParams {
    #[serde(flatten)]
    pub selector: TabSelector,
    #[serde(default)]
    pub window_id: Option<WindowId>,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub activate: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WindowParams {
    window_id: WindowId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionalWindowParams {
    #[serde(default)]
    window_id: Option<WindowId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetBoundsParams {
    window_id: WindowId,
    bounds: BoundsUpdate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetParams {
    #[serde(default)]
    target_id: Option<TargetId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TabParams {
    tab_id: TabId,
}

/// One registry operation with its typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // === Windows ===
    GetWindows,
    GetActiveWindow,
    CreateWindow(CreateWindowParams),
    CloseWindow(WindowId),
    ActivateWindow(WindowId),
    ShowWindow(WindowId),
    HideWindow(WindowId),
    GetWindowBounds(WindowId),
    SetWindowBounds {
        window_id: WindowId,
        bounds: BoundsUpdate,
    },

    // === Tabs ===
    GetTabs(GetTabsParams),
    GetActiveTab {
        window_id: Option<WindowId>,
    },
    GetTabInfo(TabSelector),
    CreateTab(CreateTabParams),
    CloseTab(TabSelector),
    ActivateTab(TabSelector),
    MoveTab(MoveTabParams),
    DuplicateTab(TabSelector),
    PinTab(TabSelector),
    UnpinTab(TabSelector),
    ShowTab(ShowTabParams),
    HideTab(TabSelector),

    // === Identity ===
    GetTabForTarget {
        target_id: Option<TargetId>,
    },
    GetTargetForTab {
        tab_id: TabId,
    },
    GetWindowForTarget {
        target_id: Option<TargetId>,
    },
}

fn parse<T: DeserializeOwned>(params: &Value) -> Result<T, CommandError> {
    let value = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params.clone()
    };
    serde_json::from_value(value).map_err(|e| CommandError::InvalidParams(e.to_string()))
}

impl Command {
    /// Builds a command from its method name and JSON params.
    ///
    /// Returns `Ok(None)` for names that are not registry commands so the
    /// caller can report an unknown method.
    pub fn from_method(method: &str, params: &Value) -> Result<Option<Command>, CommandError> {
        let cmd = match method {
            "getWindows" => Command::GetWindows,
            "getActiveWindow" => Command::GetActiveWindow,
            "createWindow" => Command::CreateWindow(parse(params)?),
            "closeWindow" => Command::CloseWindow(parse::<WindowParams>(params)?.window_id),
            "activateWindow" => Command::ActivateWindow(parse::<WindowParams>(params)?.window_id),
            "showWindow" => Command::ShowWindow(parse::<WindowParams>(params)?.window_id),
            "hideWindow" => Command::HideWindow(parse::<WindowParams>(params)?.window_id),
            "getWindowBounds" => {
                Command::GetWindowBounds(parse::<WindowParams>(params)?.window_id)
            }
            "setWindowBounds" => {
                let p: SetBoundsParams = parse(params)?;
                Command::SetWindowBounds {
                    window_id: p.window_id,
                    bounds: p.bounds,
                }
            }
            "getTabs" => Command::GetTabs(parse(params)?),
            "getActiveTab" => Command::GetActiveTab {
                window_id: parse::<OptionalWindowParams>(params)?.window_id,
            },
            "getTabInfo" => Command::GetTabInfo(parse(params)?),
            "createTab" => Command::CreateTab(parse(params)?),
            "closeTab" => Command::CloseTab(parse(params)?),
            "activateTab" => Command::ActivateTab(parse(params)?),
            "moveTab" => Command::MoveTab(parse(params)?),
            "duplicateTab" => Command::DuplicateTab(parse(params)?),
            "pinTab" => Command::PinTab(parse(params)?),
            "unpinTab" => Command::UnpinTab(parse(params)?),
            "showTab" => Command::ShowTab(parse(params)?),
            "hideTab" => Command::HideTab(parse(params)?),
            "getTabForTarget" => Command::GetTabForTarget {
                target_id: parse::<TargetParams>(params)?.target_id,
            },
            "getTargetForTab" => Command::GetTargetForTab {
                tab_id: parse::<TabParams>(params)?.tab_id,
            },
            "getWindowForTarget" => Command::GetWindowForTarget {
                target_id: parse::<TargetParams>(params)?.target_id,
            },
            _ => return Ok(None),
        };
        Ok(Some(cmd))
    }

    pub fn method(&self) -> &'static str {
        match self {
            Command::GetWindows => "getWindows",
            Command::GetActiveWindow => "getActiveWindow",
            Command::CreateWindow(_) => "createWindow",
            Command::CloseWindow(_) => "closeWindow",
            Command::ActivateWindow(_) => "activateWindow",
            Command::ShowWindow(_) => "showWindow",
            Command::HideWindow(_) => "hideWindow",
            Command::GetWindowBounds(_) => "getWindowBounds",
            Command::SetWindowBounds { .. } => "setWindowBounds",
            Command::GetTabs(_) => "getTabs",
            Command::GetActiveTab { .. } => "getActiveTab",
            Command::GetTabInfo(_) => "getTabInfo",
            Command::CreateTab(_) => "createTab",
            Command::CloseTab(_) => "closeTab",
            Command::ActivateTab(_) => "activateTab",
            Command::MoveTab(_) => "moveTab",
            Command::DuplicateTab(_) => "duplicateTab",
            Command::PinTab(_) => "pinTab",
            Command::UnpinTab(_) => "unpinTab",
            Command::ShowTab(_) => "showTab",
            Command::HideTab(_) => "hideTab",
            Command::GetTabForTarget { .. } => "getTabForTarget",
            Command::GetTargetForTab { .. } => "getTargetForTab",
            Command::GetWindowForTarget { .. } => "getWindowForTarget",
        }
    }
}

/// Result payload of a command, serialized as a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Windows {
        windows: Vec<WindowInfo>,
    },
    Window {
        window: WindowInfo,
    },
    Tabs {
        tabs: Vec<TabInfo>,
    },
    Tab {
        tab: TabInfo,
    },
    /// `tab` is `null` when there is no active tab.
    ActiveTab {
        tab: Option<TabInfo>,
    },
    #[serde(rename_all = "camelCase")]
    TabForTarget {
        tab_id: TabId,
        #[serde(skip_serializing_if = "Option::is_none")]
        window_id: Option<WindowId>,
    },
    #[serde(rename_all = "camelCase")]
    TargetForTab {
        target_id: TargetId,
        #[serde(skip_serializing_if = "Option::is_none")]
        window_id: Option<WindowId>,
    },
    #[serde(rename_all = "camelCase")]
    WindowForTarget {
        window_id: WindowId,
        bounds: WindowBounds,
    },
    Bounds {
        bounds: WindowBounds,
    },
    Empty {},
}

impl CommandOutput {
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
