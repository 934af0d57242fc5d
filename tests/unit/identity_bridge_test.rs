use tabwarden::host::desktop::Desktop;
use tabwarden::host::{NewWindow, TabContents, WindowDirectory};
use tabwarden::managers::hidden_tab_pool::HiddenTabPool;
use tabwarden::managers::identity_bridge::{bind_target, IdentityBridge};
use tabwarden::types::context::BrowserContextId;
use tabwarden::types::tab::{TabId, TargetId};
use tabwarden::types::window::{BoundsUpdate, WindowBounds, WindowId};

fn ctx() -> BrowserContextId {
    BrowserContextId::new("default")
}

/// Window 1 with tab 1 attached, plus one hidden tab.
fn setup() -> (Desktop, HiddenTabPool, TabId) {
    let mut desktop = Desktop::new();
    let window = desktop.create_window(NewWindow::normal(ctx())).unwrap();
    desktop
        .window_mut(window)
        .unwrap()
        .tabs_mut()
        .insert_at(TabContents::new(TabId(1), ctx()), None, true);

    let mut pool = HiddenTabPool::new();
    let mut contents = TabContents::new(TabId(50), ctx());
    contents.bind_target();
    pool.adopt(contents);
    (desktop, pool, TabId(50))
}

#[test]
fn test_bind_target_is_stable() {
    let mut contents = TabContents::new(TabId(1), ctx());
    assert!(contents.target_id().is_none());
    let first = bind_target(&mut contents);
    let second = bind_target(&mut contents);
    assert_eq!(first, second);
}

#[test]
fn test_distinct_instances_get_distinct_targets() {
    let mut a = TabContents::new(TabId(1), ctx());
    let mut b = TabContents::new(TabId(2), ctx());
    assert_ne!(bind_target(&mut a), bind_target(&mut b));
}

#[test]
fn test_target_for_tab_binds_lazily() {
    let (mut desktop, mut pool, _) = setup();
    let (target, window) = IdentityBridge::new(&mut desktop, &mut pool)
        .target_for_tab(TabId(1))
        .unwrap();
    assert_eq!(window, Some(WindowId(1)));

    let bound = desktop.window(WindowId(1)).unwrap().tabs().get(0).unwrap().target_id().cloned();
    assert_eq!(bound, Some(target.clone()));

    let (again, _) = IdentityBridge::new(&mut desktop, &mut pool)
        .target_for_tab(TabId(1))
        .unwrap();
    assert_eq!(again, target);
}

#[test]
fn test_target_for_hidden_tab_has_no_window() {
    let (mut desktop, mut pool, hidden) = setup();
    let (target, window) = IdentityBridge::new(&mut desktop, &mut pool)
        .target_for_tab(hidden)
        .unwrap();
    assert_eq!(window, None);
    assert_eq!(pool.find_by_target_id(&target).unwrap().tab_id(), hidden);
}

#[test]
fn test_target_for_unknown_tab_is_not_found() {
    let (mut desktop, mut pool, _) = setup();
    let err = IdentityBridge::new(&mut desktop, &mut pool)
        .target_for_tab(TabId(404))
        .unwrap_err();
    assert_eq!(err.kind(), "NotFound");
}

#[test]
fn test_tab_for_target_round_trip() {
    let (mut desktop, mut pool, _) = setup();
    let mut bridge = IdentityBridge::new(&mut desktop, &mut pool);
    let (target, _) = bridge.target_for_tab(TabId(1)).unwrap();
    let (tab, window) = bridge.tab_for_target(&target).unwrap();
    assert_eq!(tab, TabId(1));
    assert_eq!(window, Some(WindowId(1)));
}

#[test]
fn test_tab_for_unknown_target_is_not_found() {
    let (mut desktop, mut pool, _) = setup();
    let bridge = IdentityBridge::new(&mut desktop, &mut pool);
    let err = bridge.tab_for_target(&TargetId::from("0000")).unwrap_err();
    assert_eq!(err.kind(), "NotFound");
}

#[test]
fn test_window_for_target_reports_bounds() {
    let (mut desktop, mut pool, _) = setup();
    let custom = BoundsUpdate {
        width: Some(640),
        ..Default::default()
    }
    .apply_to(&WindowBounds::default());
    desktop.set_bounds(WindowId(1), custom).unwrap();

    let mut bridge = IdentityBridge::new(&mut desktop, &mut pool);
    let (target, _) = bridge.target_for_tab(TabId(1)).unwrap();
    let (window, bounds) = bridge.window_for_target(&target).unwrap();
    assert_eq!(window, WindowId(1));
    assert_eq!(bounds.width, 640);
}

#[test]
fn test_window_for_hidden_target_is_not_found() {
    let (mut desktop, mut pool, hidden) = setup();
    let target = pool.find_by_tab_id(hidden).unwrap().target_id().cloned().unwrap();
    let bridge = IdentityBridge::new(&mut desktop, &mut pool);
    let err = bridge.window_for_target(&target).unwrap_err();
    assert_eq!(err.kind(), "NotFound");
}
