use serde::{Deserialize, Serialize};

/// Top-level registry settings container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistrySettings {
    pub tabs: TabSettings,
    pub hidden_tabs: HiddenTabSettings,
    pub windows: WindowSettings,
    pub history: HistorySettings,
    pub rpc: RpcSettings,
    pub log: LogSettings,
}

/// Defaults for newly created tabs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TabSettings {
    /// Url loaded into the initial tab of a new window when none is given.
    pub default_url: String,
}

impl Default for TabSettings {
    fn default() -> Self {
        Self {
            default_url: "about:blank".to_string(),
        }
    }
}

/// What survives a hide/show cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HiddenTabSettings {
    pub preserve_pinned: bool,
    /// Used when `showTab` does not say whether to activate.
    pub activate_on_show: bool,
}

impl Default for HiddenTabSettings {
    fn default() -> Self {
        Self {
            preserve_pinned: false,
            activate_on_show: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    /// Close a window once a command removes its last tab.
    pub close_when_empty: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            close_when_empty: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistorySettings {
    pub record_closed_tabs: bool,
    pub max_results: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            record_closed_tabs: true,
            max_results: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RpcSettings {
    pub max_requests_per_second: u32,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            max_requests_per_second: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
