//! Sync session: snapshot feeds wired into the store and rule engine.

use mockable::Clock;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::board::{
    domain::{OwnerId, Task},
    ports::{BoardNotifier, RemoteBoard, SnapshotEvent},
};

use super::engine::RuleEngine;
use super::state::{BoardStateStore, SnapshotApplication};

/// Background listeners applying remote snapshots to the board.
///
/// One listener per collection: tasks (drag-gated), columns
/// (task-preserving), and rules. Every applied snapshot is followed by a
/// rule-engine pass, which is how automation reacts to both remote edits
/// and the engine's own round-tripped moves. The first feed failure per
/// collection falls back to a one-time manual reload; later failures are
/// only logged.
pub struct SyncSession {
    listeners: Vec<JoinHandle<()>>,
}

impl SyncSession {
    /// Spawns the three collection listeners on the current runtime.
    #[must_use]
    pub fn spawn<R, N, C>(
        owner: OwnerId,
        store: Arc<BoardStateStore<C>>,
        remote: Arc<R>,
        engine: Arc<RuleEngine<R, N, C>>,
    ) -> Self
    where
        R: RemoteBoard + 'static,
        N: BoardNotifier + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let listeners = vec![
            tokio::spawn(listen_tasks(
                owner,
                Arc::clone(&store),
                Arc::clone(&remote),
                Arc::clone(&engine),
            )),
            tokio::spawn(listen_columns(
                owner,
                Arc::clone(&store),
                Arc::clone(&remote),
                Arc::clone(&engine),
            )),
            tokio::spawn(listen_rules(owner, store, remote, engine)),
        ];
        Self { listeners }
    }

    /// Stops the listeners. Without this they run until the feeds close.
    pub fn shutdown(self) {
        for listener in self.listeners {
            listener.abort();
        }
    }
}

async fn apply_tasks<R, N, C>(
    store: &BoardStateStore<C>,
    engine: &RuleEngine<R, N, C>,
    tasks: Vec<Task>,
) where
    R: RemoteBoard + 'static,
    N: BoardNotifier + 'static,
    C: Clock + Send + Sync,
{
    if store.apply_task_snapshot(tasks) == SnapshotApplication::Suppressed {
        tracing::debug!("task snapshot suppressed during drag");
        return;
    }
    engine.run_once().await;
}

async fn listen_tasks<R, N, C>(
    owner: OwnerId,
    store: Arc<BoardStateStore<C>>,
    remote: Arc<R>,
    engine: Arc<RuleEngine<R, N, C>>,
) where
    R: RemoteBoard + 'static,
    N: BoardNotifier + 'static,
    C: Clock + Send + Sync,
{
    let mut feed = remote.subscribe_tasks(owner);
    let mut reloaded = false;
    loop {
        match feed.recv().await {
            Ok(SnapshotEvent::Snapshot(tasks)) => {
                apply_tasks(&store, &engine, tasks).await;
            }
            Ok(SnapshotEvent::Failed(err)) => {
                tracing::warn!(error = %err, "task feed failed");
                if !reloaded {
                    reloaded = true;
                    match remote.fetch_tasks(owner).await {
                        Ok(tasks) => apply_tasks(&store, &engine, tasks).await,
                        Err(fetch_err) => {
                            tracing::warn!(error = %fetch_err, "manual task reload failed");
                        }
                    }
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                // State-based feed: the next snapshot carries everything.
                tracing::debug!(skipped, "task feed lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn listen_columns<R, N, C>(
    owner: OwnerId,
    store: Arc<BoardStateStore<C>>,
    remote: Arc<R>,
    engine: Arc<RuleEngine<R, N, C>>,
) where
    R: RemoteBoard + 'static,
    N: BoardNotifier + 'static,
    C: Clock + Send + Sync,
{
    let mut feed = remote.subscribe_columns(owner);
    let mut reloaded = false;
    loop {
        match feed.recv().await {
            Ok(SnapshotEvent::Snapshot(columns)) => {
                store.apply_column_snapshot(columns);
                engine.run_once().await;
            }
            Ok(SnapshotEvent::Failed(err)) => {
                tracing::warn!(error = %err, "column feed failed");
                if !reloaded {
                    reloaded = true;
                    match remote.fetch_columns(owner).await {
                        Ok(columns) => {
                            store.apply_column_snapshot(columns);
                            engine.run_once().await;
                        }
                        Err(fetch_err) => {
                            tracing::warn!(error = %fetch_err, "manual column reload failed");
                        }
                    }
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "column feed lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn listen_rules<R, N, C>(
    owner: OwnerId,
    store: Arc<BoardStateStore<C>>,
    remote: Arc<R>,
    engine: Arc<RuleEngine<R, N, C>>,
) where
    R: RemoteBoard + 'static,
    N: BoardNotifier + 'static,
    C: Clock + Send + Sync,
{
    let mut feed = remote.subscribe_rules(owner);
    let mut reloaded = false;
    loop {
        match feed.recv().await {
            Ok(SnapshotEvent::Snapshot(rules)) => {
                store.apply_rule_snapshot(rules);
                engine.run_once().await;
            }
            Ok(SnapshotEvent::Failed(err)) => {
                tracing::warn!(error = %err, "rule feed failed");
                if !reloaded {
                    reloaded = true;
                    match remote.fetch_rules(owner).await {
                        Ok(rules) => {
                            store.apply_rule_snapshot(rules);
                            engine.run_once().await;
                        }
                        Err(fetch_err) => {
                            tracing::warn!(error = %fetch_err, "manual rule reload failed");
                        }
                    }
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "rule feed lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
