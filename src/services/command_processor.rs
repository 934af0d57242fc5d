//! Window and tab commands.
//!
//! [`CommandProcessor`] borrows the host, one session's hidden pool and the
//! settings for the duration of a single command. Multi-step commands look
//! their window and tab up again right before each mutation, and put the tab
//! back somewhere owned (its source window or the hidden pool) when a later
//! step fails.

use tracing::{debug, info, warn};

use crate::host::{Host, NewWindow, TabContents, Window};
use crate::managers::closed_tab_log::ClosedTabLog;
use crate::managers::hidden_tab_pool::HiddenTabPool;
use crate::managers::identity_bridge::{bind_target, IdentityBridge};
use crate::managers::tab_locator::{LocatedTab, TabLocation, TabLocator};
use crate::types::command::{
    Command, CommandOutput, CreateTabParams, CreateWindowParams, GetTabsParams, MoveTabParams,
    ShowTabParams,
};
use crate::types::context::BrowserContextId;
use crate::types::errors::CommandError;
use crate::types::settings::RegistrySettings;
use crate::types::tab::{TabId, TabInfo, TabSelector, TargetId};
use crate::types::window::{BoundsUpdate, WindowBounds, WindowId, WindowInfo};

type CommandResult = Result<CommandOutput, CommandError>;

/// Describes a pooled or attached instance, binding its target on the way.
fn tab_info(contents: &mut TabContents, attached: Option<(WindowId, usize, bool)>) -> TabInfo {
    let target_id = bind_target(contents);
    TabInfo {
        tab_id: contents.tab_id(),
        target_id,
        window_id: attached.map(|(w, _, _)| w),
        index: attached.map(|(_, i, _)| i),
        url: contents.url().to_string(),
        title: contents.title().to_string(),
        is_active: attached.is_some_and(|(_, _, active)| active),
        is_pinned: contents.is_pinned(),
        is_loading: contents.is_loading(),
        load_progress: contents.load_progress(),
        is_hidden: attached.is_none(),
        browser_context_id: contents.context().clone(),
    }
}

fn describe_in_window(window: &mut Window, index: usize) -> Option<TabInfo> {
    let window_id = window.id();
    let strip = window.tabs_mut();
    let active = strip.active_index() == Some(index);
    let contents = strip.get_mut(index)?;
    Some(tab_info(contents, Some((window_id, index, active))))
}

fn describe_window(window: &mut Window) -> Vec<TabInfo> {
    (0..window.tabs().len())
        .filter_map(|i| describe_in_window(window, i))
        .collect()
}

fn window_not_found(id: WindowId) -> CommandError {
    CommandError::not_found(format!("window {}", id))
}

fn tab_not_found(id: TabId) -> CommandError {
    CommandError::not_found(format!("tab {}", id))
}

pub struct CommandProcessor<'a> {
    host: &'a mut Host,
    pool: &'a mut HiddenTabPool,
    settings: &'a RegistrySettings,
    closed_tabs: Option<&'a ClosedTabLog>,
    default_target: Option<&'a TargetId>,
}

impl<'a> CommandProcessor<'a> {
    pub fn new(host: &'a mut Host, pool: &'a mut HiddenTabPool, settings: &'a RegistrySettings) -> Self {
        Self {
            host,
            pool,
            settings,
            closed_tabs: None,
            default_target: None,
        }
    }

    /// Closed attached tabs get recorded in `log`.
    pub fn with_closed_tab_log(mut self, log: Option<&'a ClosedTabLog>) -> Self {
        self.closed_tabs = log;
        self
    }

    /// Target used by the identity commands when the caller omits one.
    pub fn with_default_target(mut self, target: Option<&'a TargetId>) -> Self {
        self.default_target = target;
        self
    }

    pub fn execute(&mut self, command: Command) -> CommandResult {
        let method = command.method();
        let result = match command {
            Command::GetWindows => self.get_windows(),
            Command::GetActiveWindow => self.get_active_window(),
            Command::CreateWindow(params) => self.create_window(params),
            Command::CloseWindow(id) => self.close_window(id),
            Command::ActivateWindow(id) => self.activate_window(id),
            Command::ShowWindow(id) => self.show_window(id),
            Command::HideWindow(id) => self.hide_window(id),
            Command::GetWindowBounds(id) => self.get_window_bounds(id),
            Command::SetWindowBounds { window_id, bounds } => {
                self.set_window_bounds(window_id, bounds)
            }
            Command::GetTabs(params) => self.get_tabs(params),
            Command::GetActiveTab { window_id } => self.get_active_tab(window_id),
            Command::GetTabInfo(selector) => self.get_tab_info(&selector),
            Command::CreateTab(params) => self.create_tab(params),
            Command::CloseTab(selector) => self.close_tab(&selector),
            Command::ActivateTab(selector) => self.activate_tab(&selector),
            Command::MoveTab(params) => self.move_tab(params),
            Command::DuplicateTab(selector) => self.duplicate_tab(&selector),
            Command::PinTab(selector) => self.set_tab_pinned(&selector, true),
            Command::UnpinTab(selector) => self.set_tab_pinned(&selector, false),
            Command::ShowTab(params) => self.show_tab(params),
            Command::HideTab(selector) => self.hide_tab(&selector),
            Command::GetTabForTarget { target_id } => self.get_tab_for_target(target_id),
            Command::GetTargetForTab { tab_id } => self.get_target_for_tab(tab_id),
            Command::GetWindowForTarget { target_id } => self.get_window_for_target(target_id),
        };
        if let Err(err) = &result {
            debug!(method, kind = err.kind(), error = %err, "command failed");
        }
        result
    }

    // === Lookup helpers ===

    fn locate(&self, selector: &TabSelector) -> Result<LocatedTab, CommandError> {
        TabLocator::new(self.host.windows.as_ref(), &*self.pool).resolve(selector)
    }

    fn window_info(&self, id: WindowId) -> Result<WindowInfo, CommandError> {
        let window = self.host.windows.window(id).ok_or_else(|| window_not_found(id))?;
        let strip = window.tabs();
        Ok(WindowInfo {
            window_id: id,
            window_type: window.window_type(),
            bounds: window.bounds(),
            is_active: self.host.windows.active_window() == Some(id),
            is_visible: window.is_visible(),
            tab_count: strip.len(),
            active_tab_id: strip.active_tab_id(),
            browser_context_id: window.context().clone(),
        })
    }

    fn describe_attached(&mut self, window_id: WindowId, tab_id: TabId) -> Result<TabInfo, CommandError> {
        let window = self
            .host
            .windows
            .window_mut(window_id)
            .ok_or_else(|| window_not_found(window_id))?;
        let index = window.tabs().index_of(tab_id).ok_or_else(|| tab_not_found(tab_id))?;
        describe_in_window(window, index).ok_or_else(|| tab_not_found(tab_id))
    }

    fn describe_hidden(&mut self, tab_id: TabId) -> Result<TabInfo, CommandError> {
        let contents = self
            .pool
            .find_by_tab_id_mut(tab_id)
            .ok_or_else(|| tab_not_found(tab_id))?;
        Ok(tab_info(contents, None))
    }

    fn describe(&mut self, tab: &LocatedTab) -> Result<TabInfo, CommandError> {
        match tab.location {
            TabLocation::Hidden => self.describe_hidden(tab.tab_id),
            TabLocation::Attached { window, .. } => self.describe_attached(window, tab.tab_id),
        }
    }

    fn resolve_context(&self, requested: Option<&BrowserContextId>) -> Result<BrowserContextId, CommandError> {
        self.host.contexts.resolve(requested).ok_or_else(|| match requested {
            Some(id) => CommandError::server(format!("browser context {} is not available", id)),
            None => CommandError::server("no browser context available"),
        })
    }

    /// Url for a new tab: the given one, or the configured default.
    fn initial_url<'u>(&'u self, url: Option<&'u str>) -> &'u str {
        url.filter(|u| !u.is_empty())
            .unwrap_or(&self.settings.tabs.default_url)
    }

    fn check_insert_index(&self, window_id: WindowId, index: Option<usize>) -> Result<(), CommandError> {
        let window = self
            .host
            .windows
            .window(window_id)
            .ok_or_else(|| window_not_found(window_id))?;
        match index {
            Some(i) if i > window.tabs().len() => Err(CommandError::invalid(format!(
                "index {} is out of range for window {} with {} tabs",
                i,
                window_id,
                window.tabs().len()
            ))),
            _ => Ok(()),
        }
    }

    // === Ownership transfer ===

    /// Takes a tab out of a window, looking both up again first.
    /// Detaches a tab from its window. Returns the contents, the index it
    /// held and whether it was the window's active tab.
    fn detach_attached(
        &mut self,
        window_id: WindowId,
        tab_id: TabId,
    ) -> Result<(TabContents, usize, bool), CommandError> {
        let window = self
            .host
            .windows
            .window_mut(window_id)
            .ok_or_else(|| window_not_found(window_id))?;
        let index = window.tabs().index_of(tab_id).ok_or_else(|| tab_not_found(tab_id))?;
        let was_active = window.tabs().active_index() == Some(index);
        let contents = window
            .tabs_mut()
            .detach_at(index)
            .ok_or_else(|| tab_not_found(tab_id))?;
        Ok((contents, index, was_active))
    }

    /// Inserts into a window. On failure the contents come back with the
    /// error so the caller can put them somewhere owned.
    fn insert_into(
        &mut self,
        window_id: WindowId,
        contents: TabContents,
        index: Option<usize>,
        activate: bool,
    ) -> Result<usize, (CommandError, TabContents)> {
        let Some(window) = self.host.windows.window_mut(window_id) else {
            return Err((window_not_found(window_id), contents));
        };
        let len = window.tabs().len();
        if let Some(i) = index.filter(|i| *i > len) {
            return Err((
                CommandError::invalid(format!("index {} is out of range for window {}", i, window_id)),
                contents,
            ));
        }
        Ok(window.tabs_mut().insert_at(contents, index, activate))
    }

    /// Puts a tab back where it came from, or into the pool if that window is gone.
    fn restore(&mut self, window_id: WindowId, index: usize, was_active: bool, contents: TabContents) {
        match self.host.windows.window_mut(window_id) {
            Some(window) => {
                let at = index.min(window.tabs().len());
                window.tabs_mut().insert_at(contents, Some(at), was_active);
            }
            None => {
                warn!(
                    tab_id = %contents.tab_id(),
                    window_id = %window_id,
                    "source window vanished, keeping tab in hidden pool"
                );
                self.pool.adopt(contents);
            }
        }
    }

    fn close_if_empty(&mut self, window_id: WindowId) {
        if !self.settings.windows.close_when_empty {
            return;
        }
        let empty = self
            .host
            .windows
            .window(window_id)
            .is_some_and(|w| w.tabs().is_empty());
        if empty {
            match self.host.windows.close_window(window_id) {
                Ok(()) => debug!(window_id = %window_id, "closed emptied window"),
                Err(e) => warn!(window_id = %window_id, error = %e, "failed to close emptied window"),
            }
        }
    }

    fn record_closed(&self, contents: &TabContents, window_id: WindowId, index: usize) {
        if !self.settings.history.record_closed_tabs {
            return;
        }
        if let Some(log) = self.closed_tabs {
            if let Err(e) = log.record(contents, window_id, index) {
                warn!(tab_id = %contents.tab_id(), error = %e, "failed to record closed tab");
            }
        }
    }

    // === Window commands ===

    fn get_windows(&mut self) -> CommandResult {
        let windows = self
            .host
            .windows
            .window_ids()
            .into_iter()
            .map(|id| self.window_info(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CommandOutput::Windows { windows })
    }

    fn get_active_window(&mut self) -> CommandResult {
        let id = self
            .host
            .windows
            .active_window()
            .ok_or_else(|| CommandError::not_found("no active window"))?;
        Ok(CommandOutput::Window {
            window: self.window_info(id)?,
        })
    }

    fn create_window(&mut self, params: CreateWindowParams) -> CommandResult {
        if let Some(bounds) = &params.bounds {
            bounds.validate()?;
        }
        let context = self.resolve_context(params.browser_context_id.as_ref())?;

        // The initial tab exists before the window so a failure leaves nothing behind.
        let mut contents = self.host.contents.create(&context)?;
        let url = self.initial_url(params.url.as_deref()).to_string();
        self.host.contents.navigate(&mut contents, &url)?;

        let bounds = params
            .bounds
            .map(|b| b.apply_to(&WindowBounds::default()))
            .unwrap_or_default();
        let window_id = self.host.windows.create_window(NewWindow {
            window_type: params.window_type.unwrap_or_default(),
            bounds,
            hidden: params.hidden,
            context,
        })?;
        self.insert_into(window_id, contents, None, true)
            .map_err(|(err, _)| err)?;

        info!(window_id = %window_id, url = %url, hidden = params.hidden, "window created");
        Ok(CommandOutput::Window {
            window: self.window_info(window_id)?,
        })
    }

    fn close_window(&mut self, id: WindowId) -> CommandResult {
        let window = self.host.windows.window_mut(id).ok_or_else(|| window_not_found(id))?;
        let tabs = window.tabs_mut().drain();
        let closed = tabs.len();
        drop(tabs);
        self.host.windows.close_window(id)?;

        info!(window_id = %id, tabs = closed, "window closed");
        Ok(CommandOutput::Empty {})
    }

    fn activate_window(&mut self, id: WindowId) -> CommandResult {
        self.host.windows.activate_window(id)?;
        Ok(CommandOutput::Window {
            window: self.window_info(id)?,
        })
    }

    fn show_window(&mut self, id: WindowId) -> CommandResult {
        self.host.windows.show_window(id)?;
        Ok(CommandOutput::Window {
            window: self.window_info(id)?,
        })
    }

    fn hide_window(&mut self, id: WindowId) -> CommandResult {
        self.host.windows.hide_window(id)?;
        Ok(CommandOutput::Window {
            window: self.window_info(id)?,
        })
    }

    fn get_window_bounds(&mut self, id: WindowId) -> CommandResult {
        let window = self.host.windows.window(id).ok_or_else(|| window_not_found(id))?;
        Ok(CommandOutput::Bounds {
            bounds: window.bounds(),
        })
    }

    fn set_window_bounds(&mut self, id: WindowId, update: BoundsUpdate) -> CommandResult {
        update.validate()?;
        let current = self
            .host
            .windows
            .window(id)
            .ok_or_else(|| window_not_found(id))?
            .bounds();
        let bounds = update.apply_to(&current);
        self.host.windows.set_bounds(id, bounds)?;
        Ok(CommandOutput::Bounds { bounds })
    }

    // === Tab queries ===

    fn get_tabs(&mut self, params: GetTabsParams) -> CommandResult {
        let mut tabs = Vec::new();
        match params.window_id {
            Some(id) => {
                let window = self.host.windows.window_mut(id).ok_or_else(|| window_not_found(id))?;
                tabs.extend(describe_window(window));
            }
            None => {
                for id in self.host.windows.window_ids() {
                    if let Some(window) = self.host.windows.window_mut(id) {
                        tabs.extend(describe_window(window));
                    }
                }
                if params.include_hidden {
                    tabs.extend(self.pool.tabs_mut().iter_mut().map(|c| tab_info(c, None)));
                }
            }
        }
        Ok(CommandOutput::Tabs { tabs })
    }

    fn get_active_tab(&mut self, window_id: Option<WindowId>) -> CommandResult {
        let window_id = match window_id {
            Some(id) => {
                if self.host.windows.window(id).is_none() {
                    return Err(window_not_found(id));
                }
                Some(id)
            }
            None => self.host.windows.active_window(),
        };
        let tab = window_id
            .and_then(|id| self.host.windows.window_mut(id))
            .and_then(|window| {
                let index = window.tabs().active_index()?;
                describe_in_window(window, index)
            });
        Ok(CommandOutput::ActiveTab { tab })
    }

    fn get_tab_info(&mut self, selector: &TabSelector) -> CommandResult {
        let tab = self.locate(selector)?;
        Ok(CommandOutput::Tab {
            tab: self.describe(&tab)?,
        })
    }

    // === Tab mutations ===

    fn create_tab(&mut self, params: CreateTabParams) -> CommandResult {
        if params.hidden {
            return self.create_hidden_tab(params);
        }

        let target = match params.window_id {
            Some(id) => {
                self.check_insert_index(id, params.index)?;
                Some(id)
            }
            None => self.host.windows.active_window(),
        };
        let context = match (&params.browser_context_id, target) {
            (Some(requested), target) => {
                let context = self.resolve_context(Some(requested))?;
                if let Some(window) = target.and_then(|id| self.host.windows.window(id)) {
                    if params.window_id.is_some() && window.context() != &context {
                        return Err(CommandError::invalid(format!(
                            "window {} belongs to a different browser context",
                            window.id()
                        )));
                    }
                }
                context
            }
            (None, Some(id)) => match self.host.windows.window(id) {
                Some(window) => window.context().clone(),
                None => self.resolve_context(None)?,
            },
            (None, None) => self.resolve_context(None)?,
        };
        // An implicit target in another context is skipped in favour of a new window.
        let target = target.filter(|id| {
            self.host
                .windows
                .window(*id)
                .is_some_and(|w| w.context() == &context)
        });
        if params.window_id.is_none() {
            if let Some(id) = target {
                self.check_insert_index(id, params.index)?;
            } else if params.index.is_some_and(|i| i > 0) {
                return Err(CommandError::invalid("index is out of range for a new window"));
            }
        }

        let mut contents = self.host.contents.create(&context)?;
        let url = self.initial_url(params.url.as_deref()).to_string();
        self.host.contents.navigate(&mut contents, &url)?;
        contents.set_pinned(params.pinned);
        let tab_id = contents.tab_id();

        let window_id = match target {
            Some(id) => id,
            None => self.host.windows.create_window(NewWindow::normal(context))?,
        };
        self.insert_into(window_id, contents, params.index, !params.background)
            .map_err(|(err, _)| err)?;

        info!(tab_id = %tab_id, window_id = %window_id, url = %url, "tab created");
        Ok(CommandOutput::Tab {
            tab: self.describe_attached(window_id, tab_id)?,
        })
    }

    fn create_hidden_tab(&mut self, params: CreateTabParams) -> CommandResult {
        if params.window_id.is_some() {
            return Err(CommandError::invalid("a hidden tab cannot be created in a window"));
        }
        if params.pinned {
            return Err(CommandError::invalid("a hidden tab cannot be pinned"));
        }
        let context = self.resolve_context(params.browser_context_id.as_ref())?;
        let tab_id = self.pool.create_hidden(
            self.host.contents.as_mut(),
            &context,
            params.url.as_deref(),
        )?;

        info!(tab_id = %tab_id, "hidden tab created");
        Ok(CommandOutput::Tab {
            tab: self.describe_hidden(tab_id)?,
        })
    }

    fn close_tab(&mut self, selector: &TabSelector) -> CommandResult {
        let tab = self.locate(selector)?;
        match tab.location {
            TabLocation::Hidden => {
                let contents = self.pool.detach(tab.tab_id).ok_or_else(|| tab_not_found(tab.tab_id))?;
                drop(contents);
                info!(tab_id = %tab.tab_id, "hidden tab closed");
            }
            TabLocation::Attached { window, .. } => {
                let (contents, index, _) = self.detach_attached(window, tab.tab_id)?;
                self.record_closed(&contents, window, index);
                drop(contents);
                self.close_if_empty(window);
                info!(tab_id = %tab.tab_id, window_id = %window, "tab closed");
            }
        }
        Ok(CommandOutput::Empty {})
    }

    fn require_attached(tab: &LocatedTab, action: &str) -> Result<(WindowId, usize), CommandError> {
        match tab.location {
            TabLocation::Attached { window, index } => Ok((window, index)),
            TabLocation::Hidden => Err(CommandError::invalid(format!(
                "cannot {} tab {}: tab is hidden",
                action, tab.tab_id
            ))),
        }
    }

    fn activate_tab(&mut self, selector: &TabSelector) -> CommandResult {
        let tab = self.locate(selector)?;
        let (window_id, index) = Self::require_attached(&tab, "activate")?;

        let window = self
            .host
            .windows
            .window_mut(window_id)
            .ok_or_else(|| window_not_found(window_id))?;
        if !window.tabs_mut().activate_at(index) {
            return Err(tab_not_found(tab.tab_id));
        }
        self.host.windows.activate_window(window_id)?;
        Ok(CommandOutput::Tab {
            tab: self.describe_attached(window_id, tab.tab_id)?,
        })
    }

    fn move_tab(&mut self, params: MoveTabParams) -> CommandResult {
        let tab = self.locate(&params.selector)?;
        let (source, index) = Self::require_attached(&tab, "move")?;
        let dest = params.window_id.unwrap_or(source);

        if dest == source {
            let window = self
                .host
                .windows
                .window_mut(source)
                .ok_or_else(|| window_not_found(source))?;
            let len = window.tabs().len();
            let to = params.index.unwrap_or(len.saturating_sub(1));
            if to >= len {
                return Err(CommandError::invalid(format!(
                    "index {} is out of range for window {} with {} tabs",
                    to, source, len
                )));
            }
            window.tabs_mut().move_to(index, to);
            debug!(tab_id = %tab.tab_id, window_id = %source, from = index, to, "tab reordered");
            return Ok(CommandOutput::Tab {
                tab: self.describe_attached(source, tab.tab_id)?,
            });
        }

        self.check_insert_index(dest, params.index)?;
        let source_context = self
            .host
            .windows
            .window(source)
            .map(|w| w.context().clone());
        let dest_context = self.host.windows.window(dest).map(|w| w.context().clone());
        if source_context != dest_context {
            return Err(CommandError::invalid(
                "cannot move a tab between browser contexts",
            ));
        }

        let (contents, from, was_active) = self.detach_attached(source, tab.tab_id)?;
        if let Err((err, contents)) = self.insert_into(dest, contents, params.index, false) {
            self.restore(source, from, was_active, contents);
            return Err(err);
        }
        self.close_if_empty(source);

        info!(tab_id = %tab.tab_id, from = %source, to = %dest, "tab moved between windows");
        Ok(CommandOutput::Tab {
            tab: self.describe_attached(dest, tab.tab_id)?,
        })
    }

    fn duplicate_tab(&mut self, selector: &TabSelector) -> CommandResult {
        let tab = self.locate(selector)?;
        let (window_id, index) = Self::require_attached(&tab, "duplicate")?;

        let source = self
            .host
            .windows
            .window(window_id)
            .and_then(|w| w.tabs().get(index))
            .filter(|c| c.tab_id() == tab.tab_id)
            .ok_or_else(|| tab_not_found(tab.tab_id))?;
        let copy = self.host.contents.duplicate(source)?;
        let copy_id = copy.tab_id();

        // The source may have moved while the copy was being made.
        let position = self
            .host
            .windows
            .window(window_id)
            .and_then(|w| w.tabs().index_of(tab.tab_id));
        let Some(position) = position else {
            drop(copy);
            return Err(tab_not_found(tab.tab_id));
        };
        self.insert_into(window_id, copy, Some(position + 1), true)
            .map_err(|(err, _)| err)?;

        info!(tab_id = %tab.tab_id, duplicate = %copy_id, "tab duplicated");
        Ok(CommandOutput::Tab {
            tab: self.describe_attached(window_id, copy_id)?,
        })
    }

    fn set_tab_pinned(&mut self, selector: &TabSelector, pinned: bool) -> CommandResult {
        let tab = self.locate(selector)?;
        let action = if pinned { "pin" } else { "unpin" };
        let (window_id, index) = Self::require_attached(&tab, action)?;

        let window = self
            .host
            .windows
            .window_mut(window_id)
            .ok_or_else(|| window_not_found(window_id))?;
        window
            .tabs_mut()
            .set_pinned(index, pinned)
            .ok_or_else(|| tab_not_found(tab.tab_id))?;
        Ok(CommandOutput::Tab {
            tab: self.describe_attached(window_id, tab.tab_id)?,
        })
    }

    fn hide_tab(&mut self, selector: &TabSelector) -> CommandResult {
        let tab = self.locate(selector)?;
        let TabLocation::Attached { window, .. } = tab.location else {
            return Err(CommandError::invalid(format!("tab {} is already hidden", tab.tab_id)));
        };

        let (mut contents, _, _) = self.detach_attached(window, tab.tab_id)?;
        if !self.settings.hidden_tabs.preserve_pinned {
            contents.set_pinned(false);
        }
        self.pool.adopt(contents);
        self.close_if_empty(window);

        info!(tab_id = %tab.tab_id, window_id = %window, "tab hidden");
        Ok(CommandOutput::Tab {
            tab: self.describe_hidden(tab.tab_id)?,
        })
    }

    fn show_tab(&mut self, params: ShowTabParams) -> CommandResult {
        let tab = self.locate(&params.selector)?;
        if !tab.is_hidden() {
            return Err(CommandError::invalid(format!("tab {} is not hidden", tab.tab_id)));
        }
        let activate = params
            .activate
            .unwrap_or(self.settings.hidden_tabs.activate_on_show);
        let context = self
            .pool
            .find_by_tab_id(tab.tab_id)
            .map(|c| c.context().clone())
            .ok_or_else(|| tab_not_found(tab.tab_id))?;

        // Everything that can be checked up front is checked before the tab
        // leaves the pool.
        let target = match params.window_id {
            Some(id) => {
                self.check_insert_index(id, params.index)?;
                let window = self.host.windows.window(id).ok_or_else(|| window_not_found(id))?;
                if window.context() != &context {
                    return Err(CommandError::invalid(format!(
                        "window {} belongs to a different browser context",
                        id
                    )));
                }
                Some(id)
            }
            None => self.host.windows.active_window().filter(|id| {
                self.host
                    .windows
                    .window(*id)
                    .is_some_and(|w| w.context() == &context)
            }),
        };
        match target {
            Some(id) if params.window_id.is_none() => self.check_insert_index(id, params.index)?,
            None if params.index.is_some_and(|i| i > 0) => {
                return Err(CommandError::invalid("index is out of range for a new window"));
            }
            _ => {}
        }

        let contents = self.pool.detach(tab.tab_id).ok_or_else(|| tab_not_found(tab.tab_id))?;
        let window_id = match target {
            Some(id) => id,
            None => match self.host.windows.create_window(NewWindow::normal(context)) {
                Ok(id) => id,
                Err(err) => {
                    self.pool.adopt(contents);
                    return Err(err.into());
                }
            },
        };
        if let Err((err, contents)) = self.insert_into(window_id, contents, params.index, activate) {
            self.pool.adopt(contents);
            self.close_if_empty(window_id);
            return Err(err);
        }

        if activate {
            if let Err(err) = self.host.windows.activate_window(window_id) {
                if let Ok((contents, _, _)) = self.detach_attached(window_id, tab.tab_id) {
                    self.pool.adopt(contents);
                }
                self.close_if_empty(window_id);
                return Err(err.into());
            }
        }

        info!(tab_id = %tab.tab_id, window_id = %window_id, activate, "tab shown");
        Ok(CommandOutput::Tab {
            tab: self.describe_attached(window_id, tab.tab_id)?,
        })
    }

    // === Identity ===

    fn requested_target(&self, target_id: Option<TargetId>) -> Result<TargetId, CommandError> {
        target_id
            .or_else(|| self.default_target.cloned())
            .ok_or_else(|| CommandError::invalid("no targetId given and the session has no attached target"))
    }

    fn get_tab_for_target(&mut self, target_id: Option<TargetId>) -> CommandResult {
        let target_id = self.requested_target(target_id)?;
        let bridge = IdentityBridge::new(self.host.windows.as_mut(), &mut *self.pool);
        let (tab_id, window_id) = bridge.tab_for_target(&target_id)?;
        Ok(CommandOutput::TabForTarget { tab_id, window_id })
    }

    fn get_target_for_tab(&mut self, tab_id: TabId) -> CommandResult {
        let mut bridge = IdentityBridge::new(self.host.windows.as_mut(), &mut *self.pool);
        let (target_id, window_id) = bridge.target_for_tab(tab_id)?;
        Ok(CommandOutput::TargetForTab { target_id, window_id })
    }

    fn get_window_for_target(&mut self, target_id: Option<TargetId>) -> CommandResult {
        let target_id = self.requested_target(target_id)?;
        let bridge = IdentityBridge::new(self.host.windows.as_mut(), &mut *self.pool);
        let (window_id, bounds) = bridge.window_for_target(&target_id)?;
        Ok(CommandOutput::WindowForTarget { window_id, bounds })
    }
}
