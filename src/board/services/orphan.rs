//! Orphan reconciliation: purging tasks deleted out from under the board.

use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::board::{
    domain::{OwnerId, Task, TaskId},
    ports::{RemoteResult, RemoteTasks},
};

use super::state::BoardStateStore;

/// Periodically compares local task ids with the remote truth and purges
/// the ones that no longer exist.
///
/// The snapshot feed already converges the projection, but a feed that went
/// quiet (dropped subscription, suppressed snapshots) can leave deleted
/// tasks on the board; the sweep is the backstop.
pub struct OrphanReconciler<R, C>
where
    R: RemoteTasks,
    C: Clock,
{
    store: Arc<BoardStateStore<C>>,
    remote: Arc<R>,
    interval: Duration,
}

impl<R, C> OrphanReconciler<R, C>
where
    R: RemoteTasks,
    C: Clock,
{
    /// Creates a reconciler sweeping on the given period.
    #[must_use]
    pub const fn new(store: Arc<BoardStateStore<C>>, remote: Arc<R>, interval: Duration) -> Self {
        Self {
            store,
            remote,
            interval,
        }
    }

    /// Runs one sweep, returning the purged task identifiers.
    ///
    /// A purged task that was selected clears the selection.
    ///
    /// # Errors
    ///
    /// Returns the remote error when the full task fetch fails; local state
    /// is left untouched in that case.
    pub async fn reconcile(&self, owner: OwnerId) -> RemoteResult<Vec<TaskId>> {
        let remote_ids: HashSet<TaskId> = self
            .remote
            .fetch_tasks(owner)
            .await?
            .iter()
            .map(Task::id)
            .collect();
        let purged = self.store.retain_tasks(&remote_ids);
        if !purged.is_empty() {
            tracing::debug!(count = purged.len(), "purged orphaned tasks");
        }
        Ok(purged)
    }

    /// Sweeps immediately and then on every interval tick, forever.
    ///
    /// Fetch failures are logged and the loop continues; callers spawn this
    /// on the runtime and abort the task to stop it.
    pub async fn run_periodic(&self, owner: OwnerId) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            if let Err(err) = self.reconcile(owner).await {
                tracing::warn!(error = %err, "orphan sweep failed");
            }
        }
    }
}
