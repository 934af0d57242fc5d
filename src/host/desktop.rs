//! In-memory host: a window directory, a content factory handing out
//! sequential tab ids, and a fixed set of profiles.
//!
//! The `user_*` functions mutate a directory behind the registry's back, the
//! way a person clicking in the browser would.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::{ContentFactory, ContextResolver, NewWindow, TabContents, Window, WindowDirectory};
use crate::types::context::BrowserContextId;
use crate::types::errors::HostError;
use crate::types::tab::TabId;
use crate::types::window::{WindowBounds, WindowId};

pub const DEFAULT_PROFILE: &str = "default";

// === Desktop ===

/// Window directory backed by a vector kept in activation order.
#[derive(Debug)]
pub struct Desktop {
    windows: Vec<Window>,
    next_window_id: i32,
}

impl Desktop {
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
            next_window_id: 1,
        }
    }

    fn position(&self, id: WindowId) -> Result<usize, HostError> {
        self.windows
            .iter()
            .position(|w| w.id() == id)
            .ok_or(HostError::UnknownWindow(id))
    }

    fn get_mut(&mut self, id: WindowId) -> Result<&mut Window, HostError> {
        self.windows
            .iter_mut()
            .find(|w| w.id() == id)
            .ok_or(HostError::UnknownWindow(id))
    }
}

impl Default for Desktop {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowDirectory for Desktop {
    fn window_ids(&self) -> Vec<WindowId> {
        self.windows.iter().map(Window::id).collect()
    }

    fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id() == id)
    }

    fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id() == id)
    }

    fn create_window(&mut self, request: NewWindow) -> Result<WindowId, HostError> {
        let id = WindowId(self.next_window_id);
        self.next_window_id += 1;
        let hidden = request.hidden;
        let window = Window::new(id, request);
        if hidden {
            self.windows.push(window);
        } else {
            self.windows.insert(0, window);
        }
        debug!(window_id = %id, hidden, "window created");
        Ok(id)
    }

    fn close_window(&mut self, id: WindowId) -> Result<(), HostError> {
        let pos = self.position(id)?;
        let window = self.windows.remove(pos);
        debug!(window_id = %id, tabs = window.tabs().len(), "window closed");
        Ok(())
    }

    fn activate_window(&mut self, id: WindowId) -> Result<(), HostError> {
        let pos = self.position(id)?;
        let mut window = self.windows.remove(pos);
        window.set_visible(true);
        self.windows.insert(0, window);
        Ok(())
    }

    fn show_window(&mut self, id: WindowId) -> Result<(), HostError> {
        self.get_mut(id)?.set_visible(true);
        Ok(())
    }

    fn hide_window(&mut self, id: WindowId) -> Result<(), HostError> {
        self.get_mut(id)?.set_visible(false);
        Ok(())
    }

    fn set_bounds(&mut self, id: WindowId, bounds: WindowBounds) -> Result<(), HostError> {
        self.get_mut(id)?.set_bounds(bounds);
        Ok(())
    }
}

// === User actions ===

/// Closes a tab as if the user clicked its close button. A window left
/// without tabs closes too.
pub fn user_close_tab(windows: &mut dyn WindowDirectory, tab_id: TabId) -> bool {
    for id in windows.window_ids() {
        let Some(window) = windows.window_mut(id) else {
            continue;
        };
        let Some(index) = window.tabs().index_of(tab_id) else {
            continue;
        };
        drop(window.tabs_mut().detach_at(index));
        if window.tabs().is_empty() {
            if let Err(e) = windows.close_window(id) {
                warn!(window_id = %id, error = %e, "failed to close window after its last tab");
            }
        }
        return true;
    }
    false
}

pub fn user_close_window(windows: &mut dyn WindowDirectory, id: WindowId) -> bool {
    windows.close_window(id).is_ok()
}

/// Drags a tab into `to` at `index` (appended when `None`).
pub fn user_move_tab(
    windows: &mut dyn WindowDirectory,
    tab_id: TabId,
    to: WindowId,
    index: Option<usize>,
) -> bool {
    if windows.window(to).is_none() {
        return false;
    }
    let source = windows
        .window_ids()
        .into_iter()
        .find(|id| {
            windows
                .window(*id)
                .is_some_and(|w| w.tabs().index_of(tab_id).is_some())
        });
    let Some(source) = source else {
        return false;
    };
    let contents = windows.window_mut(source).and_then(|w| {
        let index = w.tabs().index_of(tab_id)?;
        w.tabs_mut().detach_at(index)
    });
    let Some(contents) = contents else {
        return false;
    };
    match windows.window_mut(to) {
        Some(dest) => {
            let len = dest.tabs().len();
            dest.tabs_mut()
                .insert_at(contents, Some(index.unwrap_or(len).min(len)), false);
            true
        }
        None => false,
    }
}

// === Contents ===

/// Content factory that numbers tabs 1, 2, 3, ...
#[derive(Debug)]
pub struct SequentialContents {
    next_tab_id: i32,
}

impl SequentialContents {
    pub fn new() -> Self {
        Self { next_tab_id: 1 }
    }
}

impl Default for SequentialContents {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentFactory for SequentialContents {
    fn create(&mut self, context: &BrowserContextId) -> Result<TabContents, HostError> {
        let id = TabId(self.next_tab_id);
        self.next_tab_id += 1;
        Ok(TabContents::new(id, context.clone()))
    }
}

// === Profiles ===

/// Context resolver over a fixed set of profile ids.
#[derive(Debug, Default)]
pub struct Profiles {
    default: Option<BrowserContextId>,
    known: HashSet<BrowserContextId>,
}

impl Profiles {
    pub fn with_default(id: &str) -> Self {
        let default = BrowserContextId::new(id);
        let mut known = HashSet::new();
        known.insert(default.clone());
        Self {
            default: Some(default),
            known,
        }
    }

    /// No profile at all; every resolution fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: &str) {
        self.known.insert(BrowserContextId::new(id));
    }
}

impl ContextResolver for Profiles {
    fn resolve(&self, requested: Option<&BrowserContextId>) -> Option<BrowserContextId> {
        match requested {
            Some(id) => self.known.get(id).cloned(),
            None => self.default.clone(),
        }
    }
}
