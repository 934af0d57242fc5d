use thiserror::Error;

use super::tab::TabId;
use super::window::WindowId;

// === CommandError ===

/// Error taxonomy returned by every registry command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The addressed window, tab or target does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The request is malformed or not valid for the addressed object's state.
    #[error("invalid params: {0}")]
    InvalidParams(String),
    /// A collaborator failed to do what was asked.
    #[error("server error: {0}")]
    ServerError(String),
}

impl CommandError {
    pub fn not_found(what: impl Into<String>) -> Self {
        CommandError::NotFound(what.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        CommandError::InvalidParams(msg.into())
    }

    pub fn server(msg: impl Into<String>) -> Self {
        CommandError::ServerError(msg.into())
    }

    /// Short machine-readable name of the error family.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::NotFound(_) => "NotFound",
            CommandError::InvalidParams(_) => "InvalidParams",
            CommandError::ServerError(_) => "ServerError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CommandError::NotFound(msg)
            | CommandError::InvalidParams(msg)
            | CommandError::ServerError(msg) => msg,
        }
    }
}

// === HostError ===

/// Errors reported by the host environment (window directory, content factory).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("window {0} not found")]
    UnknownWindow(WindowId),
    #[error("tab {0} not found")]
    UnknownTab(TabId),
    #[error("host failure: {0}")]
    Platform(String),
}

impl From<HostError> for CommandError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::UnknownWindow(id) => CommandError::NotFound(format!("window {}", id)),
            HostError::UnknownTab(id) => CommandError::NotFound(format!("tab {}", id)),
            HostError::Platform(msg) => CommandError::ServerError(msg),
        }
    }
}

// === HistoryError ===

/// Errors related to the closed tab log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Database operation failed.
    #[error("history database error: {0}")]
    DatabaseError(String),
    /// The background query did not complete.
    #[error("history query failed: {0}")]
    TaskFailed(String),
    /// No closed tab log is configured.
    #[error("History service not available")]
    Unavailable,
}

impl From<rusqlite::Error> for HistoryError {
    fn from(err: rusqlite::Error) -> Self {
        HistoryError::DatabaseError(err.to_string())
    }
}

impl From<HistoryError> for CommandError {
    fn from(err: HistoryError) -> Self {
        CommandError::ServerError(err.to_string())
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

impl From<SettingsError> for CommandError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::InvalidKey(_) | SettingsError::InvalidValue(_) => {
                CommandError::InvalidParams(err.to_string())
            }
            _ => CommandError::ServerError(err.to_string()),
        }
    }
}
