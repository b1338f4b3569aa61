//! Remote store ports: per-collection persistence plus snapshot feeds.
//!
//! The hosted document database is an external collaborator; these traits
//! capture the only contract the core relies on. Change notifications are
//! state-based: every event carries the full current record set for the
//! owner, never a delta, which keeps application idempotent under reordering
//! and loss.

use crate::board::domain::{
    Column, ColumnId, ColumnPatch, NewColumn, NewRule, NewTask, OwnerId, Rule, RuleId, RulePatch,
    Task, TaskId, TaskPatch,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Result type for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteStoreError>;

/// Event delivered on a snapshot subscription.
#[derive(Debug, Clone)]
pub enum SnapshotEvent<T> {
    /// The full current record set for the subscribed owner.
    Snapshot(Vec<T>),
    /// The subscription itself failed; the data stream may be stale.
    Failed(RemoteStoreError),
}

/// Errors returned by remote store implementations.
#[derive(Debug, Clone, Error)]
pub enum RemoteStoreError {
    /// An update targeted a task that no longer exists remotely.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// An update targeted a column that no longer exists remotely.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// An update targeted a rule that no longer exists remotely.
    #[error("rule not found: {0}")]
    RuleNotFound(RuleId),

    /// Transient read or write failure (network, permission).
    #[error("remote store unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl RemoteStoreError {
    /// Wraps a transient failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Returns whether the error means the targeted record is gone.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TaskNotFound(_) | Self::ColumnNotFound(_) | Self::RuleNotFound(_)
        )
    }
}

/// Task collection contract.
#[async_trait]
pub trait RemoteTasks: Send + Sync {
    /// Stores a new task and returns its assigned identity.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::Unavailable`] on transient failure.
    async fn create_task(&self, owner: OwnerId, draft: NewTask) -> RemoteResult<TaskId>;

    /// Applies a partial update to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::TaskNotFound`] when the task no longer
    /// exists, or [`RemoteStoreError::Unavailable`] on transient failure.
    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> RemoteResult<()>;

    /// Deletes a task. Deleting an absent task is a silent success.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::Unavailable`] on transient failure.
    async fn delete_task(&self, id: TaskId) -> RemoteResult<()>;

    /// Fetches a single task, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::Unavailable`] on transient failure.
    async fn fetch_task(&self, id: TaskId) -> RemoteResult<Option<Task>>;

    /// Fetches all tasks for the owner, newest first by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::Unavailable`] on transient failure.
    async fn fetch_tasks(&self, owner: OwnerId) -> RemoteResult<Vec<Task>>;

    /// Subscribes to full-state task snapshots for the owner.
    ///
    /// Dropping the receiver unsubscribes.
    fn subscribe_tasks(&self, owner: OwnerId) -> broadcast::Receiver<SnapshotEvent<Task>>;
}

/// Column collection contract.
#[async_trait]
pub trait RemoteColumns: Send + Sync {
    /// Stores a new column and returns its assigned identity.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::Unavailable`] on transient failure.
    async fn create_column(&self, owner: OwnerId, draft: NewColumn) -> RemoteResult<ColumnId>;

    /// Applies a partial update to an existing column.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::ColumnNotFound`] when the column no
    /// longer exists, or [`RemoteStoreError::Unavailable`] on transient
    /// failure.
    async fn update_column(&self, id: ColumnId, patch: ColumnPatch) -> RemoteResult<()>;

    /// Deletes a column. Deleting an absent column is a silent success.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::Unavailable`] on transient failure.
    async fn delete_column(&self, id: ColumnId) -> RemoteResult<()>;

    /// Fetches all columns for the owner, oldest first by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::Unavailable`] on transient failure.
    async fn fetch_columns(&self, owner: OwnerId) -> RemoteResult<Vec<Column>>;

    /// Subscribes to full-state column snapshots for the owner.
    ///
    /// Dropping the receiver unsubscribes.
    fn subscribe_columns(&self, owner: OwnerId) -> broadcast::Receiver<SnapshotEvent<Column>>;
}

/// Rule collection contract.
#[async_trait]
pub trait RemoteRules: Send + Sync {
    /// Stores a new rule and returns its assigned identity.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::Unavailable`] on transient failure.
    async fn create_rule(&self, owner: OwnerId, draft: NewRule) -> RemoteResult<RuleId>;

    /// Applies a partial update to an existing rule.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::RuleNotFound`] when the rule no longer
    /// exists, or [`RemoteStoreError::Unavailable`] on transient failure.
    async fn update_rule(&self, id: RuleId, patch: RulePatch) -> RemoteResult<()>;

    /// Deletes a rule. Deleting an absent rule is a silent success.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::Unavailable`] on transient failure.
    async fn delete_rule(&self, id: RuleId) -> RemoteResult<()>;

    /// Fetches all rules for the owner, oldest first by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::Unavailable`] on transient failure.
    async fn fetch_rules(&self, owner: OwnerId) -> RemoteResult<Vec<Rule>>;

    /// Subscribes to full-state rule snapshots for the owner.
    ///
    /// Dropping the receiver unsubscribes.
    fn subscribe_rules(&self, owner: OwnerId) -> broadcast::Receiver<SnapshotEvent<Rule>>;
}

/// Convenience bound for a store exposing all three collections.
pub trait RemoteBoard: RemoteTasks + RemoteColumns + RemoteRules {}

impl<T: RemoteTasks + RemoteColumns + RemoteRules> RemoteBoard for T {}
