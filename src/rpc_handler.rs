//! RPC method handler.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested without stdin.
//! [`handle_method`] answers synchronous methods; methods listed by
//! [`is_deferred`] go through [`handle_deferred_method`] and reply later from
//! the session's query tracker.

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::app::App;
use crate::services::query_tracker::QueryHandle;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::session::SessionId;
use crate::types::command::Command;
use crate::types::errors::CommandError;

const BROWSER_PREFIX: &str = "Browser.";

/// Errors reported on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("method not found: {0}")]
    MethodNotFound(String),
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("parse error: {0}")]
    Parse(String),
}

impl RpcError {
    pub fn code(&self) -> i64 {
        match self {
            RpcError::Command(CommandError::InvalidParams(_)) => -32602,
            RpcError::Command(CommandError::NotFound(_)) => -32001,
            RpcError::Command(CommandError::ServerError(_)) => -32000,
            RpcError::MethodNotFound(_) => -32601,
            RpcError::RateLimited => -32005,
            RpcError::Parse(_) => -32700,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::Command(err) => err.kind(),
            RpcError::MethodNotFound(_) => "MethodNotFound",
            RpcError::RateLimited => "RateLimited",
            RpcError::Parse(_) => "ParseError",
        }
    }

    pub fn to_json(&self) -> Value {
        let message = match self {
            RpcError::Command(err) => err.message().to_string(),
            other => other.to_string(),
        };
        json!({"code": self.code(), "kind": self.kind(), "message": message})
    }
}

/// Builds the response line for request `id`.
pub fn response(id: Value, result: Result<Value, RpcError>) -> Value {
    match result {
        Ok(val) => json!({"id": id, "result": val}),
        Err(err) => json!({"id": id, "error": err.to_json()}),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentlyClosedParams {
    #[serde(default)]
    max_results: Option<usize>,
}

#[derive(Deserialize)]
struct SetSettingParams {
    key: String,
    value: Value,
}

fn parse_params<T: serde::de::DeserializeOwned>(params: &Value) -> Result<T, RpcError> {
    let value = if params.is_null() { json!({}) } else { params.clone() };
    serde_json::from_value(value)
        .map_err(|e| RpcError::Command(CommandError::invalid(e.to_string())))
}

/// Methods whose result arrives after the call returns.
pub fn is_deferred(method: &str) -> bool {
    method == "History.getRecentlyClosed"
}

/// Dispatch a synchronous method call for `session`.
pub fn handle_method(
    app: &mut App,
    session: &SessionId,
    method: &str,
    params: &Value,
) -> Result<Value, RpcError> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // === Settings ===
        "Settings.get" => {
            serde_json::to_value(app.settings_engine.get_settings())
                .map_err(|e| RpcError::Command(CommandError::server(e.to_string())))
        }
        "Settings.set" => {
            let p: SetSettingParams = parse_params(params)?;
            app.settings_engine
                .set_value(&p.key, p.value)
                .map_err(CommandError::from)?;
            Ok(json!({"ok": true}))
        }

        // === History ===
        "History.clearRecentlyClosed" => {
            let removed = app.clear_recently_closed()?;
            Ok(json!({"removed": removed}))
        }

        // === Registry commands ===
        _ => {
            let name = method
                .strip_prefix(BROWSER_PREFIX)
                .ok_or_else(|| RpcError::MethodNotFound(method.to_string()))?;
            let command = Command::from_method(name, params)?
                .ok_or_else(|| RpcError::MethodNotFound(method.to_string()))?;
            let output = app.execute(session, command)?;
            Ok(output.to_json())
        }
    }
}

/// Starts a deferred method. `reply` receives the result on the control
/// thread, or never if the session closes first.
pub fn handle_deferred_method<R>(
    app: &mut App,
    session: &SessionId,
    method: &str,
    params: &Value,
    reply: R,
) -> Result<QueryHandle, RpcError>
where
    R: FnOnce(Result<Value, RpcError>) + 'static,
{
    match method {
        "History.getRecentlyClosed" => {
            let p: RecentlyClosedParams = parse_params(params)?;
            let handle = app.query_recently_closed(session, p.max_results, move |entries| {
                let result = entries
                    .map(|entries| json!({"entries": entries}))
                    .map_err(|e| RpcError::Command(e.into()));
                reply(result);
            })?;
            Ok(handle)
        }
        _ => Err(RpcError::MethodNotFound(method.to_string())),
    }
}
