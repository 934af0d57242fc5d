use tabwarden::host::desktop::SequentialContents;
use tabwarden::host::{ContentFactory, ContentsDelegate, TabContents};
use tabwarden::managers::hidden_tab_pool::HiddenTabPool;
use tabwarden::types::context::BrowserContextId;
use tabwarden::types::errors::HostError;
use tabwarden::types::tab::{TabId, TargetId};

/// Factory whose renderer never starts.
struct Broken;

impl ContentFactory for Broken {
    fn create(&mut self, _context: &BrowserContextId) -> Result<TabContents, HostError> {
        Err(HostError::Platform("no renderer".to_string()))
    }
}

fn ctx() -> BrowserContextId {
    BrowserContextId::new("default")
}

fn setup() -> (HiddenTabPool, SequentialContents) {
    (HiddenTabPool::new(), SequentialContents::new())
}

#[test]
fn test_create_hidden_with_url_starts_navigation() {
    let (mut pool, mut factory) = setup();
    let id = pool
        .create_hidden(&mut factory, &ctx(), Some("https://example.com"))
        .unwrap();

    let tab = pool.find_by_tab_id(id).unwrap();
    assert_eq!(tab.url(), "https://example.com");
    assert!(tab.is_loading());
    assert!(pool.is_hidden(id));
}

#[test]
fn test_create_hidden_binds_target() {
    let (mut pool, mut factory) = setup();
    let id = pool.create_hidden(&mut factory, &ctx(), None).unwrap();

    let target = pool.find_by_tab_id(id).unwrap().target_id().cloned().unwrap();
    assert_eq!(target.as_str().len(), 32);
    assert!(target
        .as_str()
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    assert_eq!(pool.find_by_target_id(&target).unwrap().tab_id(), id);
}

#[test]
fn test_create_hidden_without_url_does_not_navigate() {
    let (mut pool, mut factory) = setup();
    let a = pool.create_hidden(&mut factory, &ctx(), None).unwrap();
    let b = pool.create_hidden(&mut factory, &ctx(), Some("")).unwrap();

    for id in [a, b] {
        let tab = pool.find_by_tab_id(id).unwrap();
        assert_eq!(tab.url(), "about:blank");
        assert!(!tab.is_loading());
    }
}

#[test]
fn test_create_hidden_failure_leaves_pool_untouched() {
    let mut pool = HiddenTabPool::new();
    let result = pool.create_hidden(&mut Broken, &ctx(), Some("https://example.com"));
    assert_eq!(result, Err(HostError::Platform("no renderer".to_string())));
    assert!(pool.is_empty());
}

#[test]
fn test_find_unknown_returns_none() {
    let (mut pool, mut factory) = setup();
    pool.create_hidden(&mut factory, &ctx(), None).unwrap();
    assert!(pool.find_by_tab_id(TabId(999)).is_none());
    assert!(pool.find_by_target_id(&TargetId::from("nope")).is_none());
    assert!(!pool.is_hidden(TabId(999)));
}

#[test]
fn test_detach_hands_back_ownership() {
    let (mut pool, mut factory) = setup();
    let id = pool.create_hidden(&mut factory, &ctx(), None).unwrap();
    let contents = pool.detach(id).unwrap();
    assert_eq!(contents.tab_id(), id);
    assert!(pool.is_empty());
    assert!(pool.detach(id).is_none());
}

#[test]
fn test_adopt_keeps_identity() {
    let mut pool = HiddenTabPool::new();
    let mut contents = TabContents::new(TabId(42), ctx());
    let target = contents.bind_target().clone();
    pool.adopt(contents);

    assert!(pool.is_hidden(TabId(42)));
    assert_eq!(pool.find_by_target_id(&target).unwrap().tab_id(), TabId(42));
}

#[test]
fn test_self_close_removes_only_that_tab() {
    let (mut pool, mut factory) = setup();
    let a = pool.create_hidden(&mut factory, &ctx(), None).unwrap();
    let b = pool.create_hidden(&mut factory, &ctx(), None).unwrap();

    assert!(pool.close_contents(a));
    assert!(!pool.is_hidden(a));
    assert!(pool.is_hidden(b));
    assert!(!pool.close_contents(a));
}

#[test]
fn test_clear_destroys_everything() {
    let (mut pool, mut factory) = setup();
    for _ in 0..3 {
        pool.create_hidden(&mut factory, &ctx(), None).unwrap();
    }
    assert_eq!(pool.len(), 3);
    assert_eq!(pool.clear(), 3);
    assert!(pool.is_empty());
    assert_eq!(pool.clear(), 0);
}
