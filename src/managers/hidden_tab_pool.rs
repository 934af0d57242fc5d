use tracing::debug;

use crate::host::{ContentFactory, ContentsDelegate, TabContents};
use crate::types::context::BrowserContextId;
use crate::types::errors::HostError;
use crate::types::tab::{TabId, TargetId};

/// Page instances that live outside every window.
///
/// Owned by exactly one protocol session and destroyed with it. Instances
/// keep their tab id and target binding while pooled, so a tab shown again
/// is the same tab it was when hidden.
#[derive(Debug, Default)]
pub struct HiddenTabPool {
    tabs: Vec<TabContents>,
}

impl HiddenTabPool {
    pub fn new() -> Self {
        Self { tabs: Vec::new() }
    }

    /// Creates a new instance in `context` and keeps it in the pool.
    ///
    /// Navigation starts only when `url` is non-empty. A debugging target is
    /// bound right away so the tab is addressable by target id.
    pub fn create_hidden(
        &mut self,
        factory: &mut dyn ContentFactory,
        context: &BrowserContextId,
        url: Option<&str>,
    ) -> Result<TabId, HostError> {
        let mut contents = factory.create(context)?;
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            factory.navigate(&mut contents, url)?;
        }
        contents.bind_target();

        let tab_id = contents.tab_id();
        debug!(tab_id = %tab_id, context = %context, "hidden tab created");
        self.tabs.push(contents);
        Ok(tab_id)
    }

    pub fn find_by_tab_id(&self, tab_id: TabId) -> Option<&TabContents> {
        self.tabs.iter().find(|t| t.tab_id() == tab_id)
    }

    pub fn find_by_tab_id_mut(&mut self, tab_id: TabId) -> Option<&mut TabContents> {
        self.tabs.iter_mut().find(|t| t.tab_id() == tab_id)
    }

    pub fn find_by_target_id(&self, target_id: &TargetId) -> Option<&TabContents> {
        self.tabs.iter().find(|t| t.target_id() == Some(target_id))
    }

    pub fn is_hidden(&self, tab_id: TabId) -> bool {
        self.find_by_tab_id(tab_id).is_some()
    }

    /// Hands the instance back to the caller, removing it from the pool.
    pub fn detach(&mut self, tab_id: TabId) -> Option<TabContents> {
        let pos = self.tabs.iter().position(|t| t.tab_id() == tab_id)?;
        Some(self.tabs.remove(pos))
    }

    /// Takes ownership of an instance detached from a window.
    pub fn adopt(&mut self, contents: TabContents) {
        debug!(tab_id = %contents.tab_id(), "tab adopted into hidden pool");
        self.tabs.push(contents);
    }

    /// Destroys every pooled instance and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.tabs.len();
        self.tabs.clear();
        if count > 0 {
            debug!(count, "hidden tab pool cleared");
        }
        count
    }

    pub fn tabs(&self) -> &[TabContents] {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut [TabContents] {
        &mut self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

impl ContentsDelegate for HiddenTabPool {
    fn close_contents(&mut self, tab_id: TabId) -> bool {
        match self.detach(tab_id) {
            Some(contents) => {
                debug!(tab_id = %tab_id, "hidden tab closed itself");
                drop(contents);
                true
            }
            None => false,
        }
    }
}

impl Drop for HiddenTabPool {
    fn drop(&mut self) {
        self.clear();
    }
}
