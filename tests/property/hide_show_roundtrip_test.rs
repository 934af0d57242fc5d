//! Property-based tests for the hide/show cycle.
//!
//! For any window layout, hiding a tab and showing it again keeps its
//! identity and page state, and attaches it to the requested window.

use proptest::prelude::*;

use tabwarden::host::Host;
use tabwarden::managers::hidden_tab_pool::HiddenTabPool;
use tabwarden::services::command_processor::CommandProcessor;
use tabwarden::types::command::*;
use tabwarden::types::errors::CommandError;
use tabwarden::types::settings::RegistrySettings;
use tabwarden::types::tab::{TabInfo, TabSelector};
use tabwarden::types::window::WindowId;

struct Registry {
    host: Host,
    pool: HiddenTabPool,
    settings: RegistrySettings,
}

impl Registry {
    fn new(preserve_pinned: bool) -> Self {
        let mut settings = RegistrySettings::default();
        settings.hidden_tabs.preserve_pinned = preserve_pinned;
        Self {
            host: Host::desktop(),
            pool: HiddenTabPool::new(),
            settings,
        }
    }

    fn run(&mut self, command: Command) -> Result<CommandOutput, CommandError> {
        CommandProcessor::new(&mut self.host, &mut self.pool, &self.settings).execute(command)
    }

    fn tab(&mut self, command: Command) -> TabInfo {
        match self.run(command) {
            Ok(CommandOutput::Tab { tab }) => tab,
            other => panic!("expected a tab, got {:?}", other),
        }
    }

    /// Opens a window holding `tabs` tabs (the first `pinned` of them pinned).
    fn window_with(&mut self, tabs: usize, pinned: usize) -> (WindowId, Vec<TabInfo>) {
        let window = match self.run(Command::CreateWindow(CreateWindowParams {
            url: Some("https://w.test/0".to_string()),
            ..Default::default()
        })) {
            Ok(CommandOutput::Window { window }) => window.window_id,
            other => panic!("expected a window, got {:?}", other),
        };
        for n in 1..tabs {
            self.tab(Command::CreateTab(CreateTabParams {
                url: Some(format!("https://w.test/{}", n)),
                window_id: Some(window),
                ..Default::default()
            }));
        }
        let ids: Vec<_> = self
            .host
            .windows
            .window(window)
            .map(|w| w.tabs().iter().map(|t| t.tab_id()).collect())
            .unwrap_or_default();
        for id in ids.iter().take(pinned) {
            self.tab(Command::PinTab(TabSelector::by_tab(*id)));
        }
        let infos = ids
            .iter()
            .map(|id| self.tab(Command::GetTabInfo(TabSelector::by_tab(*id))))
            .collect();
        (window, infos)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn hide_show_keeps_identity(
        tabs in 2..7usize,
        pinned in 0..3usize,
        pick in 0..7usize,
        into_other in any::<bool>(),
        index in prop::option::of(0..8usize),
        preserve_pinned in any::<bool>(),
    ) {
        let mut registry = Registry::new(preserve_pinned);
        let (source, infos) = registry.window_with(tabs, pinned.min(tabs));
        let (other, _) = registry.window_with(2, 0);
        let before = infos[pick % infos.len()].clone();
        let selector = TabSelector::by_tab(before.tab_id);

        let hidden = registry.tab(Command::HideTab(selector.clone()));
        prop_assert!(hidden.is_hidden);
        prop_assert_eq!(hidden.window_id, None);
        prop_assert!(registry.pool.is_hidden(before.tab_id));

        let dest = if into_other { other } else { source };
        let dest_len = registry.host.windows.window(dest).map(|w| w.tabs().len()).unwrap_or(0);
        let result = registry.run(Command::ShowTab(ShowTabParams {
            selector,
            window_id: Some(dest),
            index,
            activate: None,
        }));

        if index.is_some_and(|i| i > dest_len) {
            prop_assert_eq!(result.map(|_| ()).map_err(|e| e.kind()), Err("InvalidParams"));
            prop_assert!(registry.pool.is_hidden(before.tab_id));
            return Ok(());
        }

        let shown = match result {
            Ok(CommandOutput::Tab { tab }) => tab,
            other => panic!("expected a tab, got {:?}", other),
        };
        prop_assert_eq!(shown.tab_id, before.tab_id);
        prop_assert_eq!(&shown.target_id, &before.target_id);
        prop_assert_eq!(&shown.url, &before.url);
        prop_assert_eq!(&shown.title, &before.title);
        prop_assert_eq!(shown.window_id, Some(dest));
        prop_assert_eq!(shown.is_pinned, before.is_pinned && preserve_pinned);
        prop_assert!(shown.is_active);
        prop_assert!(registry.pool.is_empty());

        let strip = registry.host.windows.window(dest).unwrap().tabs();
        prop_assert!(strip.is_consistent());
        prop_assert_eq!(strip.index_of(before.tab_id), shown.index);
    }
}
