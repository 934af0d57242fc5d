//! Cancellable background queries whose results come back to the control
//! thread.
//!
//! A query's future runs on the tokio runtime, but its callback only runs when
//! the owner calls [`QueryTracker::pump`] or awaits
//! [`QueryTracker::next_completion`]. Once a query is cancelled, or the
//! tracker is torn down, its callback never runs.

use std::collections::HashMap;
use std::future::Future;

use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Identifies one posted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryHandle(u64);

struct PendingQuery<T> {
    token: CancellationToken,
    callback: Box<dyn FnOnce(T)>,
}

pub struct QueryTracker<T> {
    cancel: CancellationToken,
    pending: HashMap<u64, PendingQuery<T>>,
    next_id: u64,
    tx: mpsc::UnboundedSender<(u64, T)>,
    rx: mpsc::UnboundedReceiver<(u64, T)>,
}

impl<T: Send + 'static> QueryTracker<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            cancel: CancellationToken::new(),
            pending: HashMap::new(),
            next_id: 1,
            tx,
            rx,
        }
    }

    /// Starts `future` on the current runtime. `callback` receives its output
    /// on the control thread, unless the query is cancelled first.
    ///
    /// Fails when called outside a tokio runtime.
    pub fn post<F, C>(&mut self, future: F, callback: C) -> Result<QueryHandle, TryCurrentError>
    where
        F: Future<Output = T> + Send + 'static,
        C: FnOnce(T) + 'static,
    {
        let runtime = Handle::try_current()?;
        let id = self.next_id;
        self.next_id += 1;

        let token = self.cancel.child_token();
        let task_token = token.clone();
        let tx = self.tx.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {}
                output = future => {
                    let _ = tx.send((id, output));
                }
            }
        });

        self.pending.insert(
            id,
            PendingQuery {
                token,
                callback: Box::new(callback),
            },
        );
        Ok(QueryHandle(id))
    }

    /// Cancels one query. Returns false if it already completed or was unknown.
    pub fn cancel(&mut self, handle: QueryHandle) -> bool {
        match self.pending.remove(&handle.0) {
            Some(query) => {
                query.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every pending query and returns how many there were. The
    /// tracker stays usable afterwards.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.cancel.cancel();
        self.pending.clear();
        while self.rx.try_recv().is_ok() {}
        self.cancel = CancellationToken::new();
        if count > 0 {
            debug!(count, "pending queries cancelled");
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: QueryHandle) -> bool {
        self.pending.contains_key(&handle.0)
    }

    fn deliver(&mut self, id: u64, output: T) -> bool {
        match self.pending.remove(&id) {
            Some(query) => {
                (query.callback)(output);
                true
            }
            None => false,
        }
    }

    /// Runs callbacks for every query that has finished so far. Returns how
    /// many ran.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok((id, output)) = self.rx.try_recv() {
            if self.deliver(id, output) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Waits until one query completes and runs its callback.
    ///
    /// Never resolves while nothing is pending, which makes it safe to use as
    /// a `select!` branch.
    pub async fn next_completion(&mut self) -> QueryHandle {
        loop {
            let Some((id, output)) = self.rx.recv().await else {
                // The tracker holds a sender, so the channel never closes.
                std::future::pending::<()>().await;
                continue;
            };
            if self.deliver(id, output) {
                return QueryHandle(id);
            }
        }
    }
}

impl<T: Send + 'static> Default for QueryTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for QueryTracker<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
