//! In-memory remote store for board reconciliation tests and simulation.
//!
//! Mirrors the hosted document database contract: per-collection CRUD plus
//! full-state snapshot feeds per owner. Mutations publish the owner's
//! complete record set to the matching feed, the way the hosted store pushes
//! query snapshots. Deterministic failure injection lets tests exercise the
//! rollback and purge paths without timing games.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

use crate::board::{
    domain::{
        Column, ColumnId, ColumnPatch, NewColumn, NewRule, NewTask, OwnerId, Rule, RuleId,
        RulePatch, Task, TaskId, TaskPatch,
    },
    ports::{
        RemoteColumns, RemoteResult, RemoteRules, RemoteStoreError, RemoteTasks, SnapshotEvent,
    },
};

/// Capacity of each snapshot feed; lagged receivers resynchronise on the
/// next full snapshot, so overflow only costs an intermediate state.
const FEED_CAPACITY: usize = 32;

/// A stored record wrapping a domain entity with persistence metadata.
#[derive(Debug, Clone)]
struct Owned<T> {
    owner: OwnerId,
    updated_at: DateTime<Utc>,
    entity: T,
}

/// Injected failures consumed by the next matching operation.
#[derive(Debug, Default)]
struct FailureScript {
    next_task_create: bool,
    next_task_update: bool,
    task_updates_for: HashSet<TaskId>,
    next_task_fetch: bool,
    next_task_list: bool,
}

#[derive(Default)]
struct RemoteState {
    tasks: HashMap<TaskId, Owned<Task>>,
    columns: HashMap<ColumnId, Owned<Column>>,
    rules: HashMap<RuleId, Owned<Rule>>,
    task_feeds: HashMap<OwnerId, broadcast::Sender<SnapshotEvent<Task>>>,
    column_feeds: HashMap<OwnerId, broadcast::Sender<SnapshotEvent<Column>>>,
    rule_feeds: HashMap<OwnerId, broadcast::Sender<SnapshotEvent<Rule>>>,
    failures: FailureScript,
}

/// Thread-safe in-memory implementation of the remote board store.
pub struct InMemoryRemoteStore<C: Clock> {
    state: Arc<RwLock<RemoteState>>,
    clock: Arc<C>,
}

impl<C: Clock> Clone for InMemoryRemoteStore<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C: Clock> InMemoryRemoteStore<C> {
    /// Creates an empty store stamping records with the given clock.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(RemoteState::default())),
            clock,
        }
    }

    /// Fails the next task creation with a transient error.
    pub fn fail_next_task_create(&self) {
        self.write().failures.next_task_create = true;
    }

    /// Fails the next task update with a transient error.
    pub fn fail_next_task_update(&self) {
        self.write().failures.next_task_update = true;
    }

    /// Fails every update targeting the given task with a transient error.
    pub fn fail_task_updates_for(&self, id: TaskId) {
        self.write().failures.task_updates_for.insert(id);
    }

    /// Fails the next single-task fetch with a transient error.
    pub fn fail_next_task_fetch(&self) {
        self.write().failures.next_task_fetch = true;
    }

    /// Fails the next full task list fetch with a transient error.
    pub fn fail_next_task_list(&self) {
        self.write().failures.next_task_list = true;
    }

    /// Pushes a subscription failure to the owner's task feed.
    pub fn emit_task_feed_error(&self, owner: OwnerId) {
        let state = self.read();
        if let Some(sender) = state.task_feeds.get(&owner) {
            if sender
                .send(SnapshotEvent::Failed(RemoteStoreError::unavailable(
                    std::io::Error::other("injected subscription failure"),
                )))
                .is_err()
            {
                // No live subscribers; nothing to notify.
            }
        }
    }

    // Poisoned locks are recovered, not propagated: the double keeps
    // serving whatever state it holds.
    fn read(&self) -> RwLockReadGuard<'_, RemoteState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RemoteState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn transient(message: &str) -> RemoteStoreError {
        RemoteStoreError::unavailable(std::io::Error::other(message.to_owned()))
    }
}

fn tasks_for(state: &RemoteState, owner: OwnerId) -> Vec<Task> {
    let mut tasks: Vec<&Owned<Task>> = state
        .tasks
        .values()
        .filter(|record| record.owner == owner)
        .collect();
    // Tasks are served newest first, matching the hosted store's query.
    tasks.sort_by(|a, b| b.entity.created_at().cmp(&a.entity.created_at()));
    tasks.into_iter().map(|record| record.entity.clone()).collect()
}

fn columns_for(state: &RemoteState, owner: OwnerId) -> Vec<Column> {
    let mut columns: Vec<&Owned<Column>> = state
        .columns
        .values()
        .filter(|record| record.owner == owner)
        .collect();
    columns.sort_by(|a, b| a.entity.created_at().cmp(&b.entity.created_at()));
    columns
        .into_iter()
        .map(|record| record.entity.clone())
        .collect()
}

fn rules_for(state: &RemoteState, owner: OwnerId) -> Vec<Rule> {
    let mut rules: Vec<&Owned<Rule>> = state
        .rules
        .values()
        .filter(|record| record.owner == owner)
        .collect();
    rules.sort_by(|a, b| a.entity.created_at().cmp(&b.entity.created_at()));
    rules.into_iter().map(|record| record.entity.clone()).collect()
}

fn publish_tasks(state: &RemoteState, owner: OwnerId) {
    if let Some(sender) = state.task_feeds.get(&owner) {
        if sender
            .send(SnapshotEvent::Snapshot(tasks_for(state, owner)))
            .is_err()
        {
            // No live subscribers; the next subscriber fetches fresh state.
        }
    }
}

fn publish_columns(state: &RemoteState, owner: OwnerId) {
    if let Some(sender) = state.column_feeds.get(&owner) {
        if sender
            .send(SnapshotEvent::Snapshot(columns_for(state, owner)))
            .is_err()
        {
            // No live subscribers; the next subscriber fetches fresh state.
        }
    }
}

fn publish_rules(state: &RemoteState, owner: OwnerId) {
    if let Some(sender) = state.rule_feeds.get(&owner) {
        if sender
            .send(SnapshotEvent::Snapshot(rules_for(state, owner)))
            .is_err()
        {
            // No live subscribers; the next subscriber fetches fresh state.
        }
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> RemoteTasks for InMemoryRemoteStore<C> {
    async fn create_task(&self, owner: OwnerId, draft: NewTask) -> RemoteResult<TaskId> {
        let mut state = self.write();
        if state.failures.next_task_create {
            state.failures.next_task_create = false;
            return Err(Self::transient("injected task create failure"));
        }

        let id = TaskId::new();
        let task = draft.into_task(id, &*self.clock);
        state.tasks.insert(
            id,
            Owned {
                owner,
                updated_at: self.clock.utc(),
                entity: task,
            },
        );
        publish_tasks(&state, owner);
        Ok(id)
    }

    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> RemoteResult<()> {
        let mut state = self.write();
        if state.failures.next_task_update {
            state.failures.next_task_update = false;
            return Err(Self::transient("injected task update failure"));
        }
        if state.failures.task_updates_for.contains(&id) {
            return Err(Self::transient("injected task update failure"));
        }

        let updated_at = self.clock.utc();
        let record = state
            .tasks
            .get_mut(&id)
            .ok_or(RemoteStoreError::TaskNotFound(id))?;
        record.entity.apply(&patch);
        record.updated_at = updated_at;
        let owner = record.owner;
        publish_tasks(&state, owner);
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> RemoteResult<()> {
        let mut state = self.write();
        if let Some(record) = state.tasks.remove(&id) {
            publish_tasks(&state, record.owner);
        }
        Ok(())
    }

    async fn fetch_task(&self, id: TaskId) -> RemoteResult<Option<Task>> {
        let mut state = self.write();
        if state.failures.next_task_fetch {
            state.failures.next_task_fetch = false;
            return Err(Self::transient("injected task fetch failure"));
        }
        Ok(state.tasks.get(&id).map(|record| record.entity.clone()))
    }

    async fn fetch_tasks(&self, owner: OwnerId) -> RemoteResult<Vec<Task>> {
        let mut state = self.write();
        if state.failures.next_task_list {
            state.failures.next_task_list = false;
            return Err(Self::transient("injected task list failure"));
        }
        Ok(tasks_for(&state, owner))
    }

    fn subscribe_tasks(&self, owner: OwnerId) -> broadcast::Receiver<SnapshotEvent<Task>> {
        self.write()
            .task_feeds
            .entry(owner)
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
            .subscribe()
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> RemoteColumns for InMemoryRemoteStore<C> {
    async fn create_column(&self, owner: OwnerId, draft: NewColumn) -> RemoteResult<ColumnId> {
        let mut state = self.write();
        let id = ColumnId::new();
        let column = draft.into_column(id, &*self.clock);
        state.columns.insert(
            id,
            Owned {
                owner,
                updated_at: self.clock.utc(),
                entity: column,
            },
        );
        publish_columns(&state, owner);
        Ok(id)
    }

    async fn update_column(&self, id: ColumnId, patch: ColumnPatch) -> RemoteResult<()> {
        let mut state = self.write();
        let updated_at = self.clock.utc();
        let record = state
            .columns
            .get_mut(&id)
            .ok_or(RemoteStoreError::ColumnNotFound(id))?;
        record.entity.apply(&patch);
        record.updated_at = updated_at;
        let owner = record.owner;
        publish_columns(&state, owner);
        Ok(())
    }

    async fn delete_column(&self, id: ColumnId) -> RemoteResult<()> {
        let mut state = self.write();
        if let Some(record) = state.columns.remove(&id) {
            publish_columns(&state, record.owner);
        }
        Ok(())
    }

    async fn fetch_columns(&self, owner: OwnerId) -> RemoteResult<Vec<Column>> {
        Ok(columns_for(&self.read(), owner))
    }

    fn subscribe_columns(&self, owner: OwnerId) -> broadcast::Receiver<SnapshotEvent<Column>> {
        self.write()
            .column_feeds
            .entry(owner)
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
            .subscribe()
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> RemoteRules for InMemoryRemoteStore<C> {
    async fn create_rule(&self, owner: OwnerId, draft: NewRule) -> RemoteResult<RuleId> {
        let mut state = self.write();
        let id = RuleId::new();
        let rule = draft.into_rule(id, &*self.clock);
        state.rules.insert(
            id,
            Owned {
                owner,
                updated_at: self.clock.utc(),
                entity: rule,
            },
        );
        publish_rules(&state, owner);
        Ok(id)
    }

    async fn update_rule(&self, id: RuleId, patch: RulePatch) -> RemoteResult<()> {
        let mut state = self.write();
        let updated_at = self.clock.utc();
        let record = state
            .rules
            .get_mut(&id)
            .ok_or(RemoteStoreError::RuleNotFound(id))?;
        record.entity.apply(&patch);
        record.updated_at = updated_at;
        let owner = record.owner;
        publish_rules(&state, owner);
        Ok(())
    }

    async fn delete_rule(&self, id: RuleId) -> RemoteResult<()> {
        let mut state = self.write();
        if let Some(record) = state.rules.remove(&id) {
            publish_rules(&state, record.owner);
        }
        Ok(())
    }

    async fn fetch_rules(&self, owner: OwnerId) -> RemoteResult<Vec<Rule>> {
        Ok(rules_for(&self.read(), owner))
    }

    fn subscribe_rules(&self, owner: OwnerId) -> broadcast::Receiver<SnapshotEvent<Rule>> {
        self.write()
            .rule_feeds
            .entry(owner)
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
            .subscribe()
    }
}
