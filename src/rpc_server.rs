//! tabwarden RPC server: JSON-RPC over stdin/stdout for an automation client.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"Browser.createTab", "params":{"url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":{"code":..,"kind":..,"message":..}}
//!
//! Logs go to stderr; stdout carries only protocol lines.

use std::io::{self, Write};
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tabwarden::app::App;
use tabwarden::platform;
use tabwarden::rpc_handler::{handle_deferred_method, handle_method, is_deferred, response, RpcError};
use tabwarden::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use tabwarden::session::SessionId;

use serde_json::{json, Value};

/// Fixed-window rate limiter: at most `max_per_second` requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn emit(line: &Value) {
    let mut stdout = io::stdout().lock();
    if writeln!(stdout, "{}", line).and_then(|_| stdout.flush()).is_err() {
        error!("failed to write to stdout");
    }
}

fn handle_line(app: &mut App, session: &SessionId, limiter: &mut RateLimiter, line: &str) {
    let req: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            emit(&response(Value::Null, Err(RpcError::Parse(e.to_string()))));
            return;
        }
    };

    let id = req.get("id").cloned().unwrap_or(Value::Null);
    if !limiter.check() {
        warn!("request rate limited");
        emit(&response(id, Err(RpcError::RateLimited)));
        return;
    }

    let method = req.get("method").and_then(Value::as_str).unwrap_or("");
    let params = req.get("params").cloned().unwrap_or(Value::Null);
    debug!(method, "request");

    if is_deferred(method) {
        let reply_id = id.clone();
        let started = handle_deferred_method(app, session, method, &params, move |result| {
            emit(&response(reply_id, result));
        });
        if let Err(err) = started {
            emit(&response(id, Err(err)));
        }
        return;
    }

    emit(&response(id, handle_method(app, session, method, &params)));
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mut settings_engine = SettingsEngine::from_env();
    let load_error = settings_engine.load().err();
    init_logging(&settings_engine.get_settings().log.level);
    if let Some(e) = load_error {
        warn!(error = %e, "settings not loaded, using defaults");
    }

    let max_per_second = settings_engine.get_settings().rpc.max_requests_per_second;
    let data_dir = platform::data_dir_from_env();
    let mut app = match App::open(&data_dir, settings_engine) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, data_dir = %data_dir.display(), "failed to initialize");
            std::process::exit(1);
        }
    };
    let session = app.open_session(None);

    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION"), "sessionId": session.to_string()}));
    info!(session = %session, "ready");

    let mut limiter = RateLimiter::new(max_per_second);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !line.trim().is_empty() {
                        handle_line(&mut app, &session, &mut limiter, &line);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "stdin read failed");
                    break;
                }
            },
            _ = app.wait_for_query(&session) => {}
        }
    }

    app.shutdown();
}
