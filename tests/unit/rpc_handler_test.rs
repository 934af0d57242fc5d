//! Unit tests for the RPC handler: every method dispatched by `handle_method`
//! and `handle_deferred_method`.
//!
//! These tests go through the same code path as the `tabwarden-rpc` binary,
//! using a temporary on-disk SQLite database for the closed tab log.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};
use tempfile::TempDir;

use tabwarden::app::App;
use tabwarden::host::Host;
use tabwarden::rpc_handler::{handle_deferred_method, handle_method, is_deferred, response, RpcError};
use tabwarden::services::settings_engine::SettingsEngine;
use tabwarden::session::SessionId;
use tabwarden::types::errors::CommandError;

/// Create a fresh App backed by a temp directory DB, with one open session.
fn setup() -> (App, SessionId, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let engine = SettingsEngine::new(Some(tmp.path().join("settings.json")));
    let mut app = App::open(tmp.path(), engine).expect("Failed to init App");
    let session = app.open_session(None);
    (app, session, tmp)
}

fn call(app: &mut App, session: &SessionId, method: &str, params: Value) -> Result<Value, RpcError> {
    handle_method(app, session, method, &params)
}

// === Ping ===

#[test]
fn test_ping() {
    let (mut app, session, _tmp) = setup();
    let res = call(&mut app, &session, "ping", json!({})).unwrap();
    assert_eq!(res, json!({"pong": true}));
}

// === Unknown method ===

#[test]
fn test_unknown_method_returns_error() {
    let (mut app, session, _tmp) = setup();
    for method in ["nonexistent.method", "Browser.frobnicate", "getWindows"] {
        let err = call(&mut app, &session, method, json!({})).unwrap_err();
        assert_eq!(err, RpcError::MethodNotFound(method.to_string()));
        assert_eq!(err.code(), -32601);
    }
}

// === Browser commands ===

#[test]
fn test_create_window_and_list_tabs() {
    let (mut app, session, _tmp) = setup();
    let window = call(
        &mut app,
        &session,
        "Browser.createWindow",
        json!({"url": "https://example.com"}),
    )
    .unwrap();
    assert_eq!(window["window"]["tabCount"], 1);
    assert_eq!(window["window"]["windowType"], "normal");

    let tabs = call(&mut app, &session, "Browser.getTabs", Value::Null).unwrap();
    let list = tabs["tabs"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["url"], "https://example.com");
    assert_eq!(list[0]["isHidden"], false);
    assert_eq!(list[0]["index"], 0);
}

#[test]
fn test_hidden_tab_round_trip_over_rpc() {
    let (mut app, session, _tmp) = setup();
    let window = call(&mut app, &session, "Browser.createWindow", json!({})).unwrap();
    let window_id = window["window"]["windowId"].clone();

    let created = call(
        &mut app,
        &session,
        "Browser.createTab",
        json!({"url": "https://hidden.test", "hidden": true}),
    )
    .unwrap();
    let tab_id = created["tab"]["tabId"].clone();
    assert_eq!(created["tab"]["isHidden"], true);
    assert!(created["tab"].get("windowId").is_none() || created["tab"]["windowId"].is_null());

    let shown = call(
        &mut app,
        &session,
        "Browser.showTab",
        json!({"tabId": tab_id, "windowId": window_id}),
    )
    .unwrap();
    assert_eq!(shown["tab"]["windowId"], window_id);

    let err = call(
        &mut app,
        &session,
        "Browser.showTab",
        json!({"tabId": tab_id}),
    )
    .unwrap_err();
    assert_eq!(err.code(), -32602);
    assert_eq!(err.kind(), "InvalidParams");
}

#[test]
fn test_invalid_params_code() {
    let (mut app, session, _tmp) = setup();
    let err = call(&mut app, &session, "Browser.closeWindow", json!({})).unwrap_err();
    assert_eq!(err.code(), -32602);

    let err = call(
        &mut app,
        &session,
        "Browser.getTabInfo",
        json!({"tabId": 1, "targetId": "ABC"}),
    )
    .unwrap_err();
    assert_eq!(
        err,
        RpcError::Command(CommandError::InvalidParams(
            "specify either target or tab identifier, not both".to_string()
        ))
    );
}

#[test]
fn test_not_found_code() {
    let (mut app, session, _tmp) = setup();
    let err = call(&mut app, &session, "Browser.getTabInfo", json!({"tabId": 99})).unwrap_err();
    assert_eq!(err.code(), -32001);
    assert_eq!(err.to_json()["message"], "tab 99");
}

#[test]
fn test_identity_defaults_to_attached_target() {
    let (mut app, _session, _tmp) = setup();
    let opener = app.open_session(None);
    let created = call(&mut app, &opener, "Browser.createWindow", json!({})).unwrap();
    let tab_id = created["window"]["activeTabId"].clone();
    let target = call(
        &mut app,
        &opener,
        "Browser.getTargetForTab",
        json!({"tabId": tab_id}),
    )
    .unwrap()["targetId"]
        .as_str()
        .unwrap()
        .to_string();

    let attached = app.open_session(Some(target.as_str().into()));
    let res = call(&mut app, &attached, "Browser.getTabForTarget", json!({})).unwrap();
    assert_eq!(res["tabId"], tab_id);

    let window = call(&mut app, &attached, "Browser.getWindowForTarget", Value::Null).unwrap();
    assert_eq!(window["windowId"], created["window"]["windowId"]);
    assert_eq!(window["bounds"]["width"], 1280);
}

// === Settings ===

#[test]
fn test_settings_get_and_set() {
    let (mut app, session, _tmp) = setup();
    let settings = call(&mut app, &session, "Settings.get", json!({})).unwrap();
    assert_eq!(settings["windows"]["close_when_empty"], true);

    let res = call(
        &mut app,
        &session,
        "Settings.set",
        json!({"key": "windows.close_when_empty", "value": false}),
    )
    .unwrap();
    assert_eq!(res, json!({"ok": true}));

    let window = call(&mut app, &session, "Browser.createWindow", json!({})).unwrap();
    let tab_id = window["window"]["activeTabId"].clone();
    call(&mut app, &session, "Browser.closeTab", json!({"tabId": tab_id})).unwrap();
    let windows = call(&mut app, &session, "Browser.getWindows", json!({})).unwrap();
    assert_eq!(windows["windows"].as_array().unwrap().len(), 1);
}

#[test]
fn test_settings_set_bad_key() {
    let (mut app, session, _tmp) = setup();
    let err = call(
        &mut app,
        &session,
        "Settings.set",
        json!({"key": "windows.bogus", "value": 1}),
    )
    .unwrap_err();
    assert_eq!(err.code(), -32602);

    let err = call(&mut app, &session, "Settings.set", json!({"value": 1})).unwrap_err();
    assert_eq!(err.code(), -32602);
}

// === History ===

#[test]
fn test_clear_recently_closed() {
    let (mut app, session, _tmp) = setup();
    let window = call(&mut app, &session, "Browser.createWindow", json!({})).unwrap();
    let window_id = window["window"]["windowId"].clone();
    let tab = call(
        &mut app,
        &session,
        "Browser.createTab",
        json!({"windowId": window_id, "url": "https://closed.test"}),
    )
    .unwrap();
    call(
        &mut app,
        &session,
        "Browser.closeTab",
        json!({"tabId": tab["tab"]["tabId"]}),
    )
    .unwrap();

    let res = call(&mut app, &session, "History.clearRecentlyClosed", json!({})).unwrap();
    assert_eq!(res, json!({"removed": 1}));
}

#[test]
fn test_history_unavailable_without_log() {
    let tmp = TempDir::new().unwrap();
    let engine = SettingsEngine::new(Some(tmp.path().join("settings.json")));
    let mut app = App::new(Host::desktop(), engine);
    let session = app.open_session(None);

    let err = call(&mut app, &session, "History.clearRecentlyClosed", json!({})).unwrap_err();
    assert_eq!(err.code(), -32000);
    assert_eq!(err.to_json()["message"], "History service not available");

    let err = handle_deferred_method(&mut app, &session, "History.getRecentlyClosed", &json!({}), |_| {})
        .unwrap_err();
    assert_eq!(err.kind(), "ServerError");
}

#[tokio::test]
async fn test_get_recently_closed_is_deferred() {
    let (mut app, session, _tmp) = setup();
    assert!(is_deferred("History.getRecentlyClosed"));
    assert!(!is_deferred("History.clearRecentlyClosed"));

    let window = call(&mut app, &session, "Browser.createWindow", json!({})).unwrap();
    let window_id = window["window"]["windowId"].clone();
    for url in ["https://one.test", "https://two.test"] {
        let tab = call(
            &mut app,
            &session,
            "Browser.createTab",
            json!({"windowId": window_id, "url": url}),
        )
        .unwrap();
        call(
            &mut app,
            &session,
            "Browser.closeTab",
            json!({"tabId": tab["tab"]["tabId"]}),
        )
        .unwrap();
    }

    let replies: Rc<RefCell<Vec<Result<Value, RpcError>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&replies);
    let handle = handle_deferred_method(
        &mut app,
        &session,
        "History.getRecentlyClosed",
        &json!({"maxResults": 1}),
        move |result| sink.borrow_mut().push(result),
    )
    .unwrap();
    assert!(replies.borrow().is_empty());

    assert_eq!(app.wait_for_query(&session).await, handle);
    let replies = replies.borrow();
    let entries = replies[0].as_ref().unwrap()["entries"].as_array().unwrap().clone();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["url"], "https://two.test");
}

#[tokio::test]
async fn test_deferred_reply_dropped_when_session_closes() {
    let (mut app, session, _tmp) = setup();
    let replies = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&replies);
    handle_deferred_method(
        &mut app,
        &session,
        "History.getRecentlyClosed",
        &Value::Null,
        move |_| *sink.borrow_mut() += 1,
    )
    .unwrap();

    let teardown = app.close_session(&session).unwrap();
    assert_eq!(teardown.cancelled_queries, 1);
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(app.pump_queries(), 0);
    assert_eq!(*replies.borrow(), 0);
}

// === Response framing ===

#[test]
fn test_response_shapes() {
    assert_eq!(
        response(json!(1), Ok(json!({"pong": true}))),
        json!({"id": 1, "result": {"pong": true}})
    );
    let err = response(json!("a"), Err(RpcError::RateLimited));
    assert_eq!(err["id"], "a");
    assert_eq!(err["error"]["code"], -32005);
    assert_eq!(err["error"]["kind"], "RateLimited");
}
