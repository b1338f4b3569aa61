//! Board lifecycle orchestration: initial load, seeding, and CRUD.

use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

use crate::board::{
    domain::{
        BoardDomainError, Column, ColumnId, ColumnPatch, NewColumn, NewRule, NewTask, OwnerId,
        RuleAction, RuleCondition, RuleId, RulePatch, TaskId, TaskPatch,
    },
    ports::{
        BoardNotifier, IdentityError, IdentityProvider, Notice, RemoteBoard, RemoteStoreError,
    },
};

use super::state::{BoardStateStore, SnapshotApplication};

/// Stock columns created on a user's first sign-in.
const DEFAULT_COLUMNS: [(&str, &str); 4] = [
    ("To Do", "blue"),
    ("In Progress", "yellow"),
    ("Blocked", "red"),
    ("Completed", "green"),
];

/// Stock column the overdue rule targets.
const BLOCKED_COLUMN_TITLE: &str = "Blocked";

/// Stock column the subtasks rule targets.
const COMPLETED_COLUMN_TITLE: &str = "Completed";

/// Service-level errors for board lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// No user is signed in.
    #[error("no user is signed in")]
    NotSignedIn,

    /// The targeted task is not on the board.
    #[error("task not on the board: {0}")]
    UnknownTask(TaskId),

    /// The targeted column is not on the board.
    #[error("column not on the board: {0}")]
    UnknownColumn(ColumnId),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),

    /// A remote store operation failed.
    #[error(transparent)]
    Remote(#[from] RemoteStoreError),

    /// The identity provider failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Result type for board lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// What the initial load did beyond fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// The stock columns were created for a first sign-in.
    pub seeded_columns: bool,
    /// The stock rule pair was created for a first sign-in.
    pub seeded_rules: bool,
}

/// Board lifecycle orchestration service.
///
/// Every mutating operation writes remotely first and applies the change
/// locally only on success, so there is nothing to roll back on failure;
/// failures surface as an [`Notice::OperationFailed`] notice and an error.
/// Locally materialised records stamp an approximate creation time that the
/// next snapshot replaces with the remote truth.
pub struct BoardLifecycleService<R, I, N, C>
where
    R: RemoteBoard,
    I: IdentityProvider,
    N: BoardNotifier,
    C: Clock + Send + Sync,
{
    store: Arc<BoardStateStore<C>>,
    remote: Arc<R>,
    identity: Arc<I>,
    notifier: Arc<N>,
    clock: Arc<C>,
}

impl<R, I, N, C> BoardLifecycleService<R, I, N, C>
where
    R: RemoteBoard,
    I: IdentityProvider,
    N: BoardNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a new lifecycle service.
    #[must_use]
    pub const fn new(
        store: Arc<BoardStateStore<C>>,
        remote: Arc<R>,
        identity: Arc<I>,
        notifier: Arc<N>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            store,
            remote,
            identity,
            notifier,
            clock,
        }
    }

    /// Loads the signed-in user's board, seeding defaults on first use.
    ///
    /// Returns `Ok(None)` when nobody is signed in: there is no data to
    /// load and no error to report.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when any of the initial fetches or the
    /// seeding writes fail.
    pub async fn initial_load(&self) -> LifecycleResult<Option<LoadReport>> {
        let Some(user) = self.identity.current_user() else {
            tracing::debug!("no signed-in user; nothing to load");
            return Ok(None);
        };
        let result = self.try_initial_load(user.id()).await;
        self.surface_failure("load the board", result).map(Some)
    }

    async fn try_initial_load(&self, owner: OwnerId) -> LifecycleResult<LoadReport> {
        let mut columns = self.remote.fetch_columns(owner).await?;
        let mut seeded_columns = false;
        if columns.is_empty() {
            self.seed_default_columns(owner).await?;
            columns = self.remote.fetch_columns(owner).await?;
            seeded_columns = true;
        }

        let tasks = self.remote.fetch_tasks(owner).await?;

        let mut rules = self.remote.fetch_rules(owner).await?;
        let mut seeded_rules = false;
        if rules.is_empty() && self.seed_default_rules(owner, &columns).await? {
            rules = self.remote.fetch_rules(owner).await?;
            seeded_rules = true;
        }

        self.store.apply_column_snapshot(columns);
        if self.store.apply_task_snapshot(tasks) == SnapshotApplication::Suppressed {
            tracing::debug!("initial task snapshot suppressed by an active drag");
        }
        self.store.apply_rule_snapshot(rules);

        Ok(LoadReport {
            seeded_columns,
            seeded_rules,
        })
    }

    async fn seed_default_columns(&self, owner: OwnerId) -> LifecycleResult<()> {
        for (title, color) in DEFAULT_COLUMNS {
            let draft = NewColumn::new(title)?.with_color(color);
            self.remote.create_column(owner, draft).await?;
        }
        tracing::info!("seeded default columns for first sign-in");
        Ok(())
    }

    /// Seeds the stock rule pair when both target columns exist.
    async fn seed_default_rules(
        &self,
        owner: OwnerId,
        columns: &[Column],
    ) -> LifecycleResult<bool> {
        let blocked_target = columns
            .iter()
            .find(|column| column.title() == BLOCKED_COLUMN_TITLE);
        let completed_target = columns
            .iter()
            .find(|column| column.title() == COMPLETED_COLUMN_TITLE);
        let (Some(blocked), Some(completed)) = (blocked_target, completed_target) else {
            return Ok(false);
        };

        let overdue = NewRule::new(
            "Move overdue tasks to Blocked",
            RuleCondition::DueDateOverdue,
            RuleAction::MoveToColumn {
                target: blocked.id(),
            },
        );
        let finished = NewRule::new(
            "Move completed tasks when all subtasks done",
            RuleCondition::SubtasksAllCompleted,
            RuleAction::MoveToColumn {
                target: completed.id(),
            },
        );
        self.remote.create_rule(owner, overdue).await?;
        self.remote.create_rule(owner, finished).await?;
        tracing::info!("seeded default automation rules");
        Ok(true)
    }

    /// Creates a task and appends it to its column.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotSignedIn`] without a user, or the
    /// remote error when the write fails.
    pub async fn create_task(&self, draft: NewTask) -> LifecycleResult<TaskId> {
        let result = self.try_create_task(draft).await;
        self.surface_failure("create the task", result)
    }

    async fn try_create_task(&self, draft: NewTask) -> LifecycleResult<TaskId> {
        let owner = self.owner()?;
        let title = draft.title().to_owned();
        let column_id = draft.column_id();
        let id = self.remote.create_task(owner, draft.clone()).await?;
        self.store.insert_task(draft.into_task(id, &*self.clock));

        let state = self.store.snapshot();
        let column = state
            .column(column_id)
            .map_or_else(|| "the board".to_owned(), |found| found.title().to_owned());
        self.notifier.notify(Notice::TaskCreated { title, column });
        Ok(id)
    }

    /// Applies a partial update to a task, refreshing a matching
    /// selection via the projection.
    ///
    /// # Errors
    ///
    /// Returns the remote error when the write fails; the local projection
    /// is left untouched in that case.
    pub async fn update_task(&self, id: TaskId, patch: TaskPatch) -> LifecycleResult<()> {
        let result = self.try_update_task(id, patch).await;
        self.surface_failure("update the task", result)
    }

    async fn try_update_task(&self, id: TaskId, patch: TaskPatch) -> LifecycleResult<()> {
        self.remote.update_task(id, patch.clone()).await?;
        self.store.update_task(id, &patch);
        let state = self.store.snapshot();
        if let Some(task) = state.task(id) {
            self.notifier.notify(Notice::TaskUpdated {
                title: task.title().to_owned(),
            });
        }
        Ok(())
    }

    /// Deletes a task, clearing a matching selection.
    ///
    /// # Errors
    ///
    /// Returns the remote error when the delete fails.
    pub async fn delete_task(&self, id: TaskId) -> LifecycleResult<()> {
        let result = self.try_delete_task(id).await;
        self.surface_failure("delete the task", result)
    }

    async fn try_delete_task(&self, id: TaskId) -> LifecycleResult<()> {
        self.remote.delete_task(id).await?;
        self.store.remove_task(id);
        self.notifier.notify(Notice::TaskDeleted);
        Ok(())
    }

    /// Duplicates a task into `target`, or its own column when `None`.
    ///
    /// The copy is a structural clone with fresh identities throughout and
    /// a " (Copy)" title suffix.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::UnknownTask`] when the task is not on the
    /// board, or the remote error when the write fails.
    pub async fn duplicate_task(
        &self,
        id: TaskId,
        target: Option<ColumnId>,
    ) -> LifecycleResult<TaskId> {
        let result = self.try_duplicate_task(id, target).await;
        self.surface_failure("duplicate the task", result)
    }

    async fn try_duplicate_task(
        &self,
        id: TaskId,
        target: Option<ColumnId>,
    ) -> LifecycleResult<TaskId> {
        let state = self.store.snapshot();
        let task = state
            .task(id)
            .ok_or(LifecycleError::UnknownTask(id))?
            .clone();
        let column_id = target.unwrap_or_else(|| task.column_id());

        let draft = NewTask::duplicate_of(&task, column_id);
        let title = draft.title().to_owned();
        let owner = self.owner()?;
        let new_id = self.remote.create_task(owner, draft.clone()).await?;
        self.store.insert_task(draft.into_task(new_id, &*self.clock));
        self.notifier.notify(Notice::TaskDuplicated { title });
        Ok(new_id)
    }

    /// Adds a column to the board.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotSignedIn`] without a user, or the
    /// remote error when the write fails.
    pub async fn add_column(&self, draft: NewColumn) -> LifecycleResult<ColumnId> {
        let result = self.try_add_column(draft).await;
        self.surface_failure("add the column", result)
    }

    async fn try_add_column(&self, draft: NewColumn) -> LifecycleResult<ColumnId> {
        let owner = self.owner()?;
        let title = draft.title().to_owned();
        let id = self.remote.create_column(owner, draft.clone()).await?;
        self.store.add_column(draft.into_column(id, &*self.clock));
        self.notifier.notify(Notice::ColumnAdded { title });
        Ok(id)
    }

    /// Applies a partial update to a column's metadata.
    ///
    /// Tasks keep referencing the column by identifier, so a rename never
    /// re-groups or orphans them.
    ///
    /// # Errors
    ///
    /// Returns the remote error when the write fails.
    pub async fn update_column(&self, id: ColumnId, patch: ColumnPatch) -> LifecycleResult<()> {
        let result = self.try_update_column(id, patch).await;
        self.surface_failure("update the column", result)
    }

    async fn try_update_column(&self, id: ColumnId, patch: ColumnPatch) -> LifecycleResult<()> {
        self.remote.update_column(id, patch.clone()).await?;
        self.store.update_column(id, &patch);
        Ok(())
    }

    /// Deletes a column, refusing while it still holds tasks.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::UnknownColumn`] when the column is not on
    /// the board, [`BoardDomainError::ColumnNotEmpty`] when it still holds
    /// tasks, or the remote error when the delete fails.
    pub async fn delete_column(&self, id: ColumnId) -> LifecycleResult<()> {
        let state = self.store.snapshot();
        let Some(column) = state.column(id) else {
            return Err(LifecycleError::UnknownColumn(id));
        };
        if !column.tasks().is_empty() {
            self.notifier.notify(Notice::ColumnNotEmpty {
                title: column.title().to_owned(),
            });
            return Err(BoardDomainError::ColumnNotEmpty {
                id,
                task_count: column.tasks().len(),
            }
            .into());
        }
        let title = column.title().to_owned();

        let surfaced = self.surface_failure("delete the column", self.try_delete_column(id).await);
        if surfaced.is_ok() {
            self.notifier.notify(Notice::ColumnDeleted { title });
        }
        surfaced
    }

    async fn try_delete_column(&self, id: ColumnId) -> LifecycleResult<()> {
        self.remote.delete_column(id).await?;
        self.store.remove_column(id);
        Ok(())
    }

    /// Adds an automation rule.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotSignedIn`] without a user, or the
    /// remote error when the write fails.
    pub async fn add_rule(&self, draft: NewRule) -> LifecycleResult<RuleId> {
        let result = self.try_add_rule(draft).await;
        self.surface_failure("create the rule", result)
    }

    async fn try_add_rule(&self, draft: NewRule) -> LifecycleResult<RuleId> {
        let owner = self.owner()?;
        let name = draft.name().to_owned();
        let id = self.remote.create_rule(owner, draft.clone()).await?;
        self.store.add_rule(draft.into_rule(id, &*self.clock));
        self.notifier.notify(Notice::RuleCreated { name });
        Ok(id)
    }

    /// Applies a partial update to a rule.
    ///
    /// # Errors
    ///
    /// Returns the remote error when the write fails.
    pub async fn update_rule(&self, id: RuleId, patch: RulePatch) -> LifecycleResult<()> {
        let result = self.try_update_rule(id, patch).await;
        self.surface_failure("update the rule", result)
    }

    async fn try_update_rule(&self, id: RuleId, patch: RulePatch) -> LifecycleResult<()> {
        self.remote.update_rule(id, patch.clone()).await?;
        self.store.update_rule(id, &patch);
        Ok(())
    }

    /// Toggles a rule's participation in evaluation.
    ///
    /// # Errors
    ///
    /// Returns the remote error when the write fails.
    pub async fn set_rule_enabled(&self, id: RuleId, enabled: bool) -> LifecycleResult<()> {
        self.update_rule(id, RulePatch::new().with_enabled(enabled))
            .await
    }

    /// Deletes an automation rule.
    ///
    /// # Errors
    ///
    /// Returns the remote error when the delete fails.
    pub async fn delete_rule(&self, id: RuleId) -> LifecycleResult<()> {
        let result = self.try_delete_rule(id).await;
        self.surface_failure("delete the rule", result)
    }

    async fn try_delete_rule(&self, id: RuleId) -> LifecycleResult<()> {
        self.remote.delete_rule(id).await?;
        self.store.remove_rule(id);
        self.notifier.notify(Notice::RuleDeleted);
        Ok(())
    }

    /// Opens or closes a task for detail viewing.
    pub fn select_task(&self, task: Option<TaskId>) {
        self.store.select(task);
    }

    /// Signs the current user out.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Identity`] when the provider rejects the
    /// request.
    pub async fn logout(&self) -> LifecycleResult<()> {
        let result = self.identity.logout().await.map_err(LifecycleError::from);
        let surfaced = self.surface_failure("log out", result);
        if surfaced.is_ok() {
            self.notifier.notify(Notice::LoggedOut);
        }
        surfaced
    }

    fn owner(&self) -> LifecycleResult<OwnerId> {
        self.identity
            .current_user()
            .map(|user| user.id())
            .ok_or(LifecycleError::NotSignedIn)
    }

    fn surface_failure<T>(&self, operation: &str, result: LifecycleResult<T>) -> LifecycleResult<T> {
        if result.is_err() {
            self.notifier.notify(Notice::OperationFailed {
                operation: operation.to_owned(),
            });
        }
        result
    }
}
