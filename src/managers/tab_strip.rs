use crate::host::TabContents;
use crate::types::tab::{TabId, TargetId};

/// Ordered tabs of one window. The vector position is the tab index, so
/// indices stay contiguous across every insert and removal.
///
/// Pinned tabs always occupy a prefix of the strip.
#[derive(Debug, Default)]
pub struct TabStrip {
    tabs: Vec<TabContents>,
    active_tab_id: Option<TabId>,
}

impl TabStrip {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
        }
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TabContents> {
        self.tabs.iter()
    }

    pub fn get(&self, index: usize) -> Option<&TabContents> {
        self.tabs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TabContents> {
        self.tabs.get_mut(index)
    }

    pub fn index_of(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.tab_id() == tab_id)
    }

    pub fn index_of_target(&self, target_id: &TargetId) -> Option<usize> {
        self.tabs
            .iter()
            .position(|t| t.target_id() == Some(target_id))
    }

    pub fn active_tab_id(&self) -> Option<TabId> {
        self.active_tab_id
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_tab_id.and_then(|id| self.index_of(id))
    }

    /// Count of pinned tabs (they are always at the left).
    pub fn pinned_count(&self) -> usize {
        self.tabs.iter().take_while(|t| t.is_pinned()).count()
    }

    /// Where a tab with the given pinned state may land: pinned tabs inside
    /// the pinned prefix, unpinned tabs after it.
    fn clamp_index(&self, pinned: bool, requested: Option<usize>) -> usize {
        let pinned_count = self.pinned_count();
        if pinned {
            requested.unwrap_or(pinned_count).min(pinned_count)
        } else {
            requested
                .unwrap_or(self.tabs.len())
                .clamp(pinned_count, self.tabs.len())
        }
    }

    /// Inserts `contents` at `index` (appended when `None`) and returns the
    /// index it actually landed on. The first tab of an empty strip is
    /// always activated.
    pub fn insert_at(&mut self, contents: TabContents, index: Option<usize>, activate: bool) -> usize {
        let at = self.clamp_index(contents.is_pinned(), index);
        let id = contents.tab_id();
        self.tabs.insert(at, contents);
        if activate || self.active_index().is_none() {
            self.active_tab_id = Some(id);
        }
        at
    }

    /// Removes the tab at `index`. If it was active, the tab now at the same
    /// position (or the new last tab) becomes active.
    pub fn detach_at(&mut self, index: usize) -> Option<TabContents> {
        if index >= self.tabs.len() {
            return None;
        }
        let was_active = self.active_index() == Some(index);
        let contents = self.tabs.remove(index);

        if was_active {
            self.active_tab_id = if self.tabs.is_empty() {
                None
            } else {
                let next = index.min(self.tabs.len() - 1);
                Some(self.tabs[next].tab_id())
            };
        }
        Some(contents)
    }

    /// Moves the tab at `from` towards `to`, respecting the pinned prefix.
    /// Returns the final index.
    pub fn move_to(&mut self, from: usize, to: usize) -> Option<usize> {
        if from >= self.tabs.len() {
            return None;
        }
        let contents = self.tabs.remove(from);
        let at = self.clamp_index(contents.is_pinned(), Some(to));
        self.tabs.insert(at, contents);
        Some(at)
    }

    pub fn activate_at(&mut self, index: usize) -> bool {
        match self.tabs.get(index) {
            Some(t) => {
                self.active_tab_id = Some(t.tab_id());
                true
            }
            None => false,
        }
    }

    /// Pins or unpins the tab at `index`. Pinning moves it to the end of the
    /// pinned section, unpinning to just after it. Returns the new index.
    pub fn set_pinned(&mut self, index: usize, pinned: bool) -> Option<usize> {
        let current = self.tabs.get(index)?.is_pinned();
        if current == pinned {
            return Some(index);
        }

        let mut contents = self.tabs.remove(index);
        contents.set_pinned(pinned);
        let at = self.pinned_count();
        self.tabs.insert(at, contents);
        Some(at)
    }

    /// Takes every tab out, leaving the strip empty.
    pub fn drain(&mut self) -> Vec<TabContents> {
        self.active_tab_id = None;
        std::mem::take(&mut self.tabs)
    }

    /// True when no unpinned tab precedes a pinned one and the active tab
    /// (if any) is present.
    pub fn is_consistent(&self) -> bool {
        let pinned = self.pinned_count();
        let prefix_ok = self.tabs[pinned..].iter().all(|t| !t.is_pinned());
        let active_ok = match self.active_tab_id {
            Some(id) => self.index_of(id).is_some(),
            None => true,
        };
        prefix_ok && active_ok
    }
}
