//! App core.
//!
//! Owns the host environment, the settings, the closed tab log and every open
//! protocol session. All registry state is reached through here on the
//! control thread.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::database::Database;
use crate::host::Host;
use crate::managers::closed_tab_log::ClosedTabLog;
use crate::services::query_tracker::QueryHandle;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::session::{HistoryReply, ProtocolSession, SessionId, SessionTeardown};
use crate::types::command::{Command, CommandOutput};
use crate::types::errors::{CommandError, HistoryError};
use crate::types::settings::RegistrySettings;
use crate::types::tab::TargetId;

/// File name of the closed tab database inside the data directory.
pub const DATABASE_FILE: &str = "tabwarden.db";

pub struct App {
    pub host: Host,
    pub settings_engine: SettingsEngine,
    pub closed_tabs: Option<ClosedTabLog>,
    sessions: HashMap<SessionId, ProtocolSession>,
}

impl App {
    /// App without a closed tab log.
    pub fn new(host: Host, settings_engine: SettingsEngine) -> Self {
        Self {
            host,
            settings_engine,
            closed_tabs: None,
            sessions: HashMap::new(),
        }
    }

    pub fn with_closed_tab_log(mut self, log: ClosedTabLog) -> Self {
        self.closed_tabs = Some(log);
        self
    }

    /// Desktop host with the closed tab database in `data_dir`.
    pub fn open(data_dir: &Path, settings_engine: SettingsEngine) -> Result<Self, HistoryError> {
        fs::create_dir_all(data_dir).map_err(|e| {
            HistoryError::DatabaseError(format!("failed to create data directory: {}", e))
        })?;
        let db = Database::open(data_dir.join(DATABASE_FILE))?;
        info!(data_dir = %data_dir.display(), "closed tab database opened");
        Ok(Self::new(Host::desktop(), settings_engine).with_closed_tab_log(ClosedTabLog::new(Arc::new(db))))
    }

    pub fn settings(&self) -> &RegistrySettings {
        self.settings_engine.get_settings()
    }

    // === Sessions ===

    pub fn open_session(&mut self, attached_target: Option<TargetId>) -> SessionId {
        let session = ProtocolSession::new(attached_target);
        let id = session.id().clone();
        info!(session = %id, "session opened");
        self.sessions.insert(id.clone(), session);
        id
    }

    pub fn close_session(&mut self, id: &SessionId) -> Option<SessionTeardown> {
        self.sessions.remove(id).map(|mut session| session.close())
    }

    pub fn session(&self, id: &SessionId) -> Option<&ProtocolSession> {
        self.sessions.get(id)
    }

    pub fn session_mut(&mut self, id: &SessionId) -> Option<&mut ProtocolSession> {
        self.sessions.get_mut(id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn session_not_found(id: &SessionId) -> CommandError {
        CommandError::not_found(format!("session {}", id))
    }

    // === Commands ===

    pub fn execute(&mut self, id: &SessionId, command: Command) -> Result<CommandOutput, CommandError> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| Self::session_not_found(id))?;
        session.execute(
            &mut self.host,
            self.settings_engine.get_settings(),
            self.closed_tabs.as_ref(),
            command,
        )
    }

    /// `max_results` falls back to the `history.max_results` setting.
    pub fn query_recently_closed<C>(
        &mut self,
        id: &SessionId,
        max_results: Option<usize>,
        callback: C,
    ) -> Result<QueryHandle, CommandError>
    where
        C: FnOnce(HistoryReply) + 'static,
    {
        let max_results = max_results.unwrap_or(self.settings_engine.get_settings().history.max_results);
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| Self::session_not_found(id))?;
        session.query_recently_closed(self.closed_tabs.as_ref(), max_results, callback)
    }

    pub fn clear_recently_closed(&mut self) -> Result<usize, CommandError> {
        let log = self.closed_tabs.as_ref().ok_or(HistoryError::Unavailable)?;
        Ok(log.clear()?)
    }

    /// Runs callbacks of finished queries across all sessions.
    pub fn pump_queries(&mut self) -> usize {
        self.sessions.values_mut().map(ProtocolSession::pump_queries).sum()
    }

    /// Waits for the next query completion of one session. Never resolves if
    /// the session is unknown or has nothing pending.
    pub async fn wait_for_query(&mut self, id: &SessionId) -> QueryHandle {
        match self.sessions.get_mut(id) {
            Some(session) => session.next_query_completion().await,
            None => std::future::pending().await,
        }
    }

    /// Closes every session. Returns the combined teardown.
    pub fn shutdown(&mut self) -> SessionTeardown {
        let mut total = SessionTeardown::default();
        for (_, mut session) in self.sessions.drain() {
            let teardown = session.close();
            total.destroyed_tabs += teardown.destroyed_tabs;
            total.cancelled_queries += teardown.cancelled_queries;
        }
        info!(
            destroyed_tabs = total.destroyed_tabs,
            cancelled_queries = total.cancelled_queries,
            "shutdown complete"
        );
        total
    }
}
