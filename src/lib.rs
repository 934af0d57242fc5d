//! tabwarden: window and tab session registry for remote automation.
//!
//! Tracks windows and their tab strips, keeps a per-session pool of hidden
//! tabs, and resolves between tab ids, window positions and debugging target
//! ids. The library backs the `tabwarden-rpc` binary and the integration tests.

pub mod app;
pub mod database;
pub mod host;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod session;
pub mod types;
