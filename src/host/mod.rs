//! Host environment consumed by the registry.
//!
//! The registry never enumerates windows or creates page instances itself: it
//! goes through the [`WindowDirectory`], [`ContentFactory`] and
//! [`ContextResolver`] traits bundled in a [`Host`]. The in-memory
//! implementations live in [`desktop`].

pub mod desktop;

use crate::managers::tab_strip::TabStrip;
use crate::types::context::BrowserContextId;
use crate::types::errors::HostError;
use crate::types::tab::{TabId, TargetId};
use crate::types::window::{WindowBounds, WindowId, WindowType};

// === Content instances ===

/// One live page instance. Moved between windows and the hidden pool, never
/// copied: the tab id and target binding travel with it.
#[derive(Debug)]
pub struct TabContents {
    tab_id: TabId,
    context: BrowserContextId,
    url: String,
    title: String,
    loading: bool,
    load_progress: f64,
    pinned: bool,
    target: Option<TargetId>,
}

impl TabContents {
    pub fn new(tab_id: TabId, context: BrowserContextId) -> Self {
        Self {
            tab_id,
            context,
            url: "about:blank".to_string(),
            title: String::new(),
            loading: false,
            load_progress: 1.0,
            pinned: false,
            target: None,
        }
    }

    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub fn context(&self) -> &BrowserContextId {
        &self.context
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_progress(&self) -> f64 {
        self.load_progress
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }

    /// The debugging target bound to this instance, if one was requested yet.
    pub fn target_id(&self) -> Option<&TargetId> {
        self.target.as_ref()
    }

    /// Returns the bound target, minting one on first use.
    pub fn bind_target(&mut self) -> &TargetId {
        self.target.get_or_insert_with(TargetId::generate)
    }

    /// Starts loading `url`. The title shows the url until the load finishes.
    pub fn begin_navigation(&mut self, url: &str) {
        self.url = url.to_string();
        self.title = url.to_string();
        self.loading = true;
        self.load_progress = 0.1;
    }

    pub fn finish_navigation(&mut self, title: Option<&str>) {
        if let Some(title) = title {
            self.title = title.to_string();
        }
        self.loading = false;
        self.load_progress = 1.0;
    }

    /// Copies url, title and load state from `source`. Identity is untouched.
    pub fn copy_page_state_from(&mut self, source: &TabContents) {
        self.url = source.url.clone();
        self.title = source.title.clone();
        self.loading = source.loading;
        self.load_progress = source.load_progress;
    }
}

// === Windows ===

/// Parameters for a window about to be created.
#[derive(Debug, Clone)]
pub struct NewWindow {
    pub window_type: WindowType,
    pub bounds: WindowBounds,
    pub hidden: bool,
    pub context: BrowserContextId,
}

impl NewWindow {
    pub fn normal(context: BrowserContextId) -> Self {
        Self {
            window_type: WindowType::Normal,
            bounds: WindowBounds::default(),
            hidden: false,
            context,
        }
    }
}

/// A top-level window and its ordered tab strip.
#[derive(Debug)]
pub struct Window {
    id: WindowId,
    window_type: WindowType,
    bounds: WindowBounds,
    visible: bool,
    context: BrowserContextId,
    strip: TabStrip,
}

impl Window {
    pub fn new(id: WindowId, request: NewWindow) -> Self {
        Self {
            id,
            window_type: request.window_type,
            bounds: request.bounds,
            visible: !request.hidden,
            context: request.context,
            strip: TabStrip::new(),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn bounds(&self) -> WindowBounds {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn context(&self) -> &BrowserContextId {
        &self.context
    }

    pub fn tabs(&self) -> &TabStrip {
        &self.strip
    }

    pub fn tabs_mut(&mut self) -> &mut TabStrip {
        &mut self.strip
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_bounds(&mut self, bounds: WindowBounds) {
        self.bounds = bounds;
    }
}

// === Collaborator traits ===

/// Live top-level windows, ordered by last activation.
pub trait WindowDirectory {
    /// Window ids, most recently activated first.
    fn window_ids(&self) -> Vec<WindowId>;

    fn window(&self, id: WindowId) -> Option<&Window>;

    fn window_mut(&mut self, id: WindowId) -> Option<&mut Window>;

    /// Most recently activated window across all contexts.
    fn active_window(&self) -> Option<WindowId> {
        self.window_ids().first().copied()
    }

    fn create_window(&mut self, request: NewWindow) -> Result<WindowId, HostError>;

    /// Removes the window. Tabs still attached are destroyed with it.
    fn close_window(&mut self, id: WindowId) -> Result<(), HostError>;

    fn activate_window(&mut self, id: WindowId) -> Result<(), HostError>;

    fn show_window(&mut self, id: WindowId) -> Result<(), HostError>;

    fn hide_window(&mut self, id: WindowId) -> Result<(), HostError>;

    fn set_bounds(&mut self, id: WindowId, bounds: WindowBounds) -> Result<(), HostError>;
}

/// Creates unattached page instances.
pub trait ContentFactory {
    fn create(&mut self, context: &BrowserContextId) -> Result<TabContents, HostError>;

    fn navigate(&mut self, contents: &mut TabContents, url: &str) -> Result<(), HostError> {
        contents.begin_navigation(url);
        Ok(())
    }

    /// New instance in the same context carrying a copy of the page state.
    fn duplicate(&mut self, source: &TabContents) -> Result<TabContents, HostError> {
        let mut copy = self.create(source.context())?;
        copy.copy_page_state_from(source);
        Ok(copy)
    }
}

/// Maps an optional caller-supplied context id to a live browser context.
pub trait ContextResolver {
    /// `None` asks for the default context.
    fn resolve(&self, requested: Option<&BrowserContextId>) -> Option<BrowserContextId>;
}

/// Receives close requests that originate from a page instance itself.
pub trait ContentsDelegate {
    /// Returns true when the instance was known and has been destroyed.
    fn close_contents(&mut self, tab_id: TabId) -> bool;
}

/// The collaborators the registry runs against.
pub struct Host {
    pub windows: Box<dyn WindowDirectory>,
    pub contents: Box<dyn ContentFactory>,
    pub contexts: Box<dyn ContextResolver>,
}

impl Host {
    pub fn new(
        windows: Box<dyn WindowDirectory>,
        contents: Box<dyn ContentFactory>,
        contexts: Box<dyn ContextResolver>,
    ) -> Self {
        Self {
            windows,
            contents,
            contexts,
        }
    }

    /// In-memory host with a single default profile and no windows.
    pub fn desktop() -> Self {
        Self::new(
            Box::new(desktop::Desktop::new()),
            Box::new(desktop::SequentialContents::new()),
            Box::new(desktop::Profiles::with_default(desktop::DEFAULT_PROFILE)),
        )
    }
}
