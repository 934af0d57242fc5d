//! Closed tab log.
//!
//! Every attached tab closed through the registry leaves an entry here,
//! backed by SQLite via `rusqlite`. Reads can run on a blocking worker so the
//! control thread never waits on the database.

use std::future::Future;
use std::sync::Arc;

use rusqlite::{params, Connection};

use crate::database::Database;
use crate::host::TabContents;
use crate::types::errors::HistoryError;
use crate::types::history::{unix_now, ClosedTabEntry};
use crate::types::tab::TabId;
use crate::types::window::WindowId;

#[derive(Debug, Clone)]
pub struct ClosedTabLog {
    db: Arc<Database>,
}

impl ClosedTabLog {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Ok(Self::new(Arc::new(Database::open_in_memory()?)))
    }

    /// Reads a single `ClosedTabEntry` row into a struct.
    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<ClosedTabEntry> {
        let index: i64 = row.get(3)?;
        Ok(ClosedTabEntry {
            id: row.get(0)?,
            tab_id: TabId(row.get(1)?),
            window_id: WindowId(row.get(2)?),
            index: index.max(0) as usize,
            url: row.get(4)?,
            title: row.get(5)?,
            pinned: row.get(6)?,
            closed_at: row.get(7)?,
        })
    }

    fn query_recent(conn: &Connection, limit: usize) -> Result<Vec<ClosedTabEntry>, HistoryError> {
        let mut stmt = conn.prepare(
            "SELECT id, tab_id, window_id, tab_index, url, title, pinned, closed_at
             FROM closed_tabs ORDER BY closed_at DESC, id DESC LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let entries = stmt
            .query_map(params![limit], Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Records `contents` as closed from `window` at `index`. Returns the entry id.
    pub fn record(
        &self,
        contents: &TabContents,
        window: WindowId,
        index: usize,
    ) -> Result<i64, HistoryError> {
        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO closed_tabs (tab_id, window_id, tab_index, url, title, pinned, closed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                contents.tab_id().0,
                window.0,
                index as i64,
                contents.url(),
                contents.title(),
                contents.is_pinned(),
                unix_now()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recently closed tabs first.
    pub fn recent(&self, limit: usize) -> Result<Vec<ClosedTabEntry>, HistoryError> {
        let conn = self.db.connection();
        Self::query_recent(&conn, limit)
    }

    /// Same as [`recent`](Self::recent), on a blocking worker thread.
    pub fn recent_async(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ClosedTabEntry>, HistoryError>> + Send + 'static {
        let db = Arc::clone(&self.db);
        async move {
            tokio::task::spawn_blocking(move || {
                let conn = db.connection();
                Self::query_recent(&conn, limit)
            })
            .await
            .map_err(|e| HistoryError::TaskFailed(e.to_string()))?
        }
    }

    pub fn clear(&self) -> Result<usize, HistoryError> {
        let removed = self.db.connection().execute("DELETE FROM closed_tabs", [])?;
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize, HistoryError> {
        let count: i64 = self
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM closed_tabs", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }
}
