use crate::host::{TabContents, WindowDirectory};
use crate::managers::hidden_tab_pool::HiddenTabPool;
use crate::managers::tab_locator::{self, TabLocator, TabRef};
use crate::types::errors::CommandError;
use crate::types::tab::{TabId, TargetId};
use crate::types::window::{WindowBounds, WindowId};

/// Returns the target bound to `contents`, creating the binding on first use.
pub fn bind_target(contents: &mut TabContents) -> TargetId {
    contents.bind_target().clone()
}

/// Translates between tab ids, window ids and debugging target ids.
///
/// Bindings live inside the content instances; the bridge only looks them up
/// (and creates them lazily).
pub struct IdentityBridge<'a> {
    windows: &'a mut dyn WindowDirectory,
    pool: &'a mut HiddenTabPool,
}

impl<'a> IdentityBridge<'a> {
    pub fn new(windows: &'a mut dyn WindowDirectory, pool: &'a mut HiddenTabPool) -> Self {
        Self { windows, pool }
    }

    pub fn tab_for_target(
        &self,
        target_id: &TargetId,
    ) -> Result<(TabId, Option<WindowId>), CommandError> {
        let located = TabLocator::new(&*self.windows, &*self.pool)
            .locate(&TabRef::Target(target_id.clone()))
            .ok_or_else(|| CommandError::not_found(format!("target {}", target_id)))?;
        Ok((located.tab_id, located.window()))
    }

    pub fn target_for_tab(
        &mut self,
        tab_id: TabId,
    ) -> Result<(TargetId, Option<WindowId>), CommandError> {
        let located = TabLocator::new(&*self.windows, &*self.pool)
            .find_tab(tab_id)
            .ok_or_else(|| CommandError::not_found(format!("tab {}", tab_id)))?;
        let window = located.window();
        let contents = tab_locator::contents_mut(&mut *self.windows, &mut *self.pool, &located)
            .ok_or_else(|| CommandError::not_found(format!("tab {}", tab_id)))?;
        Ok((bind_target(contents), window))
    }

    /// Hidden tabs have no window, so they resolve to NotFound here.
    pub fn window_for_target(
        &self,
        target_id: &TargetId,
    ) -> Result<(WindowId, WindowBounds), CommandError> {
        let (_, window) = self.tab_for_target(target_id)?;
        let window_id = window.ok_or_else(|| {
            CommandError::not_found(format!("target {} is not attached to a window", target_id))
        })?;
        let window = self
            .windows
            .window(window_id)
            .ok_or_else(|| CommandError::not_found(format!("window {}", window_id)))?;
        Ok((window_id, window.bounds()))
    }
}
