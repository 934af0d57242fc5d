use tabwarden::host::TabContents;
use tabwarden::managers::tab_strip::TabStrip;
use tabwarden::types::context::BrowserContextId;
use tabwarden::types::tab::TabId;

fn contents(id: i32) -> TabContents {
    TabContents::new(TabId(id), BrowserContextId::new("default"))
}

/// Strip holding tabs 1..=n, tab 1 active.
fn strip_with(n: i32) -> TabStrip {
    let mut strip = TabStrip::new();
    for id in 1..=n {
        strip.insert_at(contents(id), None, false);
    }
    strip
}

fn order(strip: &TabStrip) -> Vec<i32> {
    strip.iter().map(|t| t.tab_id().0).collect()
}

#[test]
fn test_first_insert_is_activated() {
    let mut strip = TabStrip::new();
    strip.insert_at(contents(1), None, false);
    assert_eq!(strip.active_tab_id(), Some(TabId(1)));
}

#[test]
fn test_insert_appends_by_default() {
    let strip = strip_with(3);
    assert_eq!(order(&strip), vec![1, 2, 3]);
    assert_eq!(strip.active_tab_id(), Some(TabId(1)));
}

#[test]
fn test_insert_at_index_renumbers() {
    let mut strip = strip_with(3);
    let at = strip.insert_at(contents(9), Some(1), true);
    assert_eq!(at, 1);
    assert_eq!(order(&strip), vec![1, 9, 2, 3]);
    assert_eq!(strip.index_of(TabId(3)), Some(3));
    assert_eq!(strip.active_index(), Some(1));
}

#[test]
fn test_unpinned_insert_is_clamped_after_pinned_prefix() {
    let mut strip = strip_with(3);
    strip.set_pinned(0, true);
    let at = strip.insert_at(contents(9), Some(0), false);
    assert_eq!(at, 1);
    assert_eq!(order(&strip), vec![1, 9, 2, 3]);
}

#[test]
fn test_pinned_insert_is_clamped_into_pinned_prefix() {
    let mut strip = strip_with(3);
    let mut pinned = contents(9);
    pinned.set_pinned(true);
    let at = strip.insert_at(pinned, None, false);
    assert_eq!(at, 0);
    assert!(strip.is_consistent());
}

#[test]
fn test_detach_active_selects_same_position() {
    let mut strip = strip_with(3);
    strip.activate_at(1);
    let removed = strip.detach_at(1).unwrap();
    assert_eq!(removed.tab_id(), TabId(2));
    assert_eq!(order(&strip), vec![1, 3]);
    assert_eq!(strip.active_tab_id(), Some(TabId(3)));
}

#[test]
fn test_detach_last_active_selects_new_last() {
    let mut strip = strip_with(3);
    strip.activate_at(2);
    strip.detach_at(2).unwrap();
    assert_eq!(strip.active_tab_id(), Some(TabId(2)));
}

#[test]
fn test_detach_inactive_keeps_active() {
    let mut strip = strip_with(3);
    strip.detach_at(2).unwrap();
    assert_eq!(strip.active_tab_id(), Some(TabId(1)));
}

#[test]
fn test_detach_only_tab_clears_active() {
    let mut strip = strip_with(1);
    strip.detach_at(0).unwrap();
    assert!(strip.is_empty());
    assert_eq!(strip.active_tab_id(), None);
}

#[test]
fn test_detach_out_of_range() {
    let mut strip = strip_with(2);
    assert!(strip.detach_at(5).is_none());
    assert_eq!(strip.len(), 2);
}

#[test]
fn test_pin_moves_to_end_of_pinned_section() {
    let mut strip = strip_with(4);
    assert_eq!(strip.set_pinned(2, true), Some(0));
    assert_eq!(order(&strip), vec![3, 1, 2, 4]);
    assert_eq!(strip.set_pinned(3, true), Some(1));
    assert_eq!(order(&strip), vec![3, 4, 1, 2]);
    assert_eq!(strip.pinned_count(), 2);
}

#[test]
fn test_unpin_moves_just_after_pinned_section() {
    let mut strip = strip_with(4);
    strip.set_pinned(2, true);
    strip.set_pinned(3, true);
    assert_eq!(strip.set_pinned(0, false), Some(1));
    assert_eq!(order(&strip), vec![4, 3, 1, 2]);
    assert_eq!(strip.pinned_count(), 1);
    assert!(strip.is_consistent());
}

#[test]
fn test_pin_already_pinned_is_noop() {
    let mut strip = strip_with(2);
    strip.set_pinned(1, true);
    assert_eq!(strip.set_pinned(0, true), Some(0));
    assert_eq!(order(&strip), vec![2, 1]);
}

#[test]
fn test_move_within_unpinned_region() {
    let mut strip = strip_with(4);
    assert_eq!(strip.move_to(0, 3), Some(3));
    assert_eq!(order(&strip), vec![2, 3, 4, 1]);
}

#[test]
fn test_move_unpinned_into_pinned_prefix_is_clamped() {
    let mut strip = strip_with(4);
    strip.set_pinned(3, true);
    // [4p, 1, 2, 3]
    assert_eq!(strip.move_to(3, 0), Some(1));
    assert_eq!(order(&strip), vec![4, 3, 1, 2]);
    assert!(strip.is_consistent());
}

#[test]
fn test_move_keeps_active_tab() {
    let mut strip = strip_with(3);
    strip.activate_at(2);
    strip.move_to(2, 0);
    assert_eq!(strip.active_tab_id(), Some(TabId(3)));
    assert_eq!(strip.active_index(), Some(0));
}

#[test]
fn test_drain_empties_strip() {
    let mut strip = strip_with(3);
    let tabs = strip.drain();
    assert_eq!(tabs.len(), 3);
    assert!(strip.is_empty());
    assert_eq!(strip.active_tab_id(), None);
}

#[test]
fn test_index_of_target_after_binding() {
    let mut strip = strip_with(2);
    let target = strip.get_mut(1).unwrap().bind_target().clone();
    assert_eq!(strip.index_of_target(&target), Some(1));
}
