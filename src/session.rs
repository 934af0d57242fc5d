//! Protocol sessions.
//!
//! A session is one controller connection. It exclusively owns a hidden tab
//! pool and the background queries it started; closing the session destroys
//! both, and no query callback runs afterwards.

use std::fmt;

use tracing::info;
use uuid::Uuid;

use crate::host::{ContentsDelegate, Host};
use crate::managers::closed_tab_log::ClosedTabLog;
use crate::managers::hidden_tab_pool::HiddenTabPool;
use crate::services::command_processor::CommandProcessor;
use crate::services::query_tracker::{QueryHandle, QueryTracker};
use crate::types::command::{Command, CommandOutput};
use crate::types::errors::{CommandError, HistoryError};
use crate::types::history::ClosedTabEntry;
use crate::types::settings::RegistrySettings;
use crate::types::tab::{TabId, TargetId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output of a recently-closed query.
pub type HistoryReply = Result<Vec<ClosedTabEntry>, HistoryError>;

/// What a session close released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTeardown {
    pub destroyed_tabs: usize,
    pub cancelled_queries: usize,
}

pub struct ProtocolSession {
    id: SessionId,
    attached_target: Option<TargetId>,
    pool: HiddenTabPool,
    queries: QueryTracker<HistoryReply>,
    closed: bool,
}

impl ProtocolSession {
    /// `attached_target` is the target the controller is attached to, used
    /// when identity commands omit a target id.
    pub fn new(attached_target: Option<TargetId>) -> Self {
        Self {
            id: SessionId::generate(),
            attached_target,
            pool: HiddenTabPool::new(),
            queries: QueryTracker::new(),
            closed: false,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn attached_target(&self) -> Option<&TargetId> {
        self.attached_target.as_ref()
    }

    pub fn pool(&self) -> &HiddenTabPool {
        &self.pool
    }

    pub fn pending_queries(&self) -> usize {
        self.queries.pending()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), CommandError> {
        if self.closed {
            return Err(CommandError::server(format!("session {} is closed", self.id)));
        }
        Ok(())
    }

    pub fn execute(
        &mut self,
        host: &mut Host,
        settings: &RegistrySettings,
        closed_tabs: Option<&ClosedTabLog>,
        command: Command,
    ) -> Result<CommandOutput, CommandError> {
        self.ensure_open()?;
        CommandProcessor::new(host, &mut self.pool, settings)
            .with_closed_tab_log(closed_tabs)
            .with_default_target(self.attached_target.as_ref())
            .execute(command)
    }

    /// A pooled tab asked to close itself.
    pub fn close_contents(&mut self, tab_id: TabId) -> bool {
        self.pool.close_contents(tab_id)
    }

    /// Starts reading the most recently closed tabs in the background.
    /// `callback` runs on the control thread when the read completes, unless
    /// the session closes first.
    pub fn query_recently_closed<C>(
        &mut self,
        log: Option<&ClosedTabLog>,
        max_results: usize,
        callback: C,
    ) -> Result<QueryHandle, CommandError>
    where
        C: FnOnce(HistoryReply) + 'static,
    {
        self.ensure_open()?;
        let log = log.ok_or(HistoryError::Unavailable)?;
        self.queries
            .post(log.recent_async(max_results), callback)
            .map_err(|e| CommandError::server(format!("cannot schedule history query: {}", e)))
    }

    /// Runs callbacks of queries finished so far.
    pub fn pump_queries(&mut self) -> usize {
        self.queries.pump()
    }

    /// Waits for the next query completion and runs its callback.
    pub async fn next_query_completion(&mut self) -> QueryHandle {
        self.queries.next_completion().await
    }

    /// Destroys pooled tabs and cancels pending queries. Calling it again
    /// is a no-op.
    pub fn close(&mut self) -> SessionTeardown {
        if self.closed {
            return SessionTeardown::default();
        }
        self.closed = true;
        let teardown = SessionTeardown {
            cancelled_queries: self.queries.cancel_all(),
            destroyed_tabs: self.pool.clear(),
        };
        info!(
            session = %self.id,
            destroyed_tabs = teardown.destroyed_tabs,
            cancelled_queries = teardown.cancelled_queries,
            "session closed"
        );
        teardown
    }
}

impl Drop for ProtocolSession {
    fn drop(&mut self) {
        self.close();
    }
}
