use crate::host::{TabContents, WindowDirectory};
use crate::managers::hidden_tab_pool::HiddenTabPool;
use crate::types::errors::CommandError;
use crate::types::tab::{TabId, TabSelector, TargetId};
use crate::types::window::WindowId;

/// A validated tab address: exactly one of the two identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabRef {
    Target(TargetId),
    Tab(TabId),
}

impl TryFrom<&TabSelector> for TabRef {
    type Error = CommandError;

    fn try_from(selector: &TabSelector) -> Result<Self, Self::Error> {
        match (&selector.target_id, selector.tab_id) {
            (Some(_), Some(_)) => Err(CommandError::invalid(
                "specify either target or tab identifier, not both",
            )),
            (Some(target), None) => Ok(TabRef::Target(target.clone())),
            (None, Some(tab)) => Ok(TabRef::Tab(tab)),
            (None, None) => Err(CommandError::invalid(
                "either targetId or tabId must be specified",
            )),
        }
    }
}

impl std::fmt::Display for TabRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TabRef::Target(id) => write!(f, "target {}", id),
            TabRef::Tab(id) => write!(f, "tab {}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabLocation {
    Hidden,
    Attached { window: WindowId, index: usize },
}

/// Where a tab was found at the moment of resolution. Only valid until the
/// next mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedTab {
    pub tab_id: TabId,
    pub target_id: Option<TargetId>,
    pub location: TabLocation,
}

impl LocatedTab {
    pub fn is_hidden(&self) -> bool {
        matches!(self.location, TabLocation::Hidden)
    }

    pub fn window(&self) -> Option<WindowId> {
        match self.location {
            TabLocation::Attached { window, .. } => Some(window),
            TabLocation::Hidden => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self.location {
            TabLocation::Attached { index, .. } => Some(index),
            TabLocation::Hidden => None,
        }
    }
}

fn located(contents: &TabContents, location: TabLocation) -> LocatedTab {
    LocatedTab {
        tab_id: contents.tab_id(),
        target_id: contents.target_id().cloned(),
        location,
    }
}

/// Resolves tab addresses against the hidden pool and the live windows.
///
/// Nothing is cached: every call scans the current state.
pub struct TabLocator<'a> {
    windows: &'a dyn WindowDirectory,
    pool: &'a HiddenTabPool,
}

impl<'a> TabLocator<'a> {
    pub fn new(windows: &'a dyn WindowDirectory, pool: &'a HiddenTabPool) -> Self {
        Self { windows, pool }
    }

    pub fn resolve(&self, selector: &TabSelector) -> Result<LocatedTab, CommandError> {
        let tab_ref = TabRef::try_from(selector)?;
        self.locate(&tab_ref)
            .ok_or_else(|| CommandError::not_found(tab_ref.to_string()))
    }

    /// Looks in the hidden pool first, then in every window in activation
    /// order.
    pub fn locate(&self, tab_ref: &TabRef) -> Option<LocatedTab> {
        let pooled = match tab_ref {
            TabRef::Target(target) => self.pool.find_by_target_id(target),
            TabRef::Tab(tab) => self.pool.find_by_tab_id(*tab),
        };
        if let Some(contents) = pooled {
            return Some(located(contents, TabLocation::Hidden));
        }

        for window_id in self.windows.window_ids() {
            let Some(window) = self.windows.window(window_id) else {
                continue;
            };
            let strip = window.tabs();
            let index = match tab_ref {
                TabRef::Target(target) => strip.index_of_target(target),
                TabRef::Tab(tab) => strip.index_of(*tab),
            };
            if let Some(index) = index {
                let contents = strip.get(index)?;
                return Some(located(
                    contents,
                    TabLocation::Attached {
                        window: window_id,
                        index,
                    },
                ));
            }
        }
        None
    }

    pub fn find_tab(&self, tab_id: TabId) -> Option<LocatedTab> {
        self.locate(&TabRef::Tab(tab_id))
    }
}

/// Borrows the instance a located tab points at, if it is still there.
pub fn contents<'a>(
    windows: &'a dyn WindowDirectory,
    pool: &'a HiddenTabPool,
    tab: &LocatedTab,
) -> Option<&'a TabContents> {
    match tab.location {
        TabLocation::Hidden => pool.find_by_tab_id(tab.tab_id),
        TabLocation::Attached { window, index } => windows
            .window(window)?
            .tabs()
            .get(index)
            .filter(|c| c.tab_id() == tab.tab_id),
    }
}

pub fn contents_mut<'a>(
    windows: &'a mut dyn WindowDirectory,
    pool: &'a mut HiddenTabPool,
    tab: &LocatedTab,
) -> Option<&'a mut TabContents> {
    match tab.location {
        TabLocation::Hidden => pool.find_by_tab_id_mut(tab.tab_id),
        TabLocation::Attached { window, index } => windows
            .window_mut(window)?
            .tabs_mut()
            .get_mut(index)
            .filter(|c| c.tab_id() == tab.tab_id),
    }
}
