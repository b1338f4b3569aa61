//! Drag reconciliation: optimistic moves, rollback, and snapshot gating.

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::sync::{Arc, PoisonError, RwLock};

use crate::board::{
    domain::{ColumnId, TaskId, TaskPatch},
    ports::{BoardNotifier, Notice, RemoteTasks},
};

use super::state::{BoardStateStore, ColumnState};

/// Phase of the drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragPhase {
    Idle,
    Dragging { started_at: DateTime<Utc> },
}

/// Idle/Dragging state machine consulted before applying task snapshots.
///
/// A gesture left dangling (the drop callback never fired) would suppress
/// snapshots forever, so a phase older than the configured timeout is
/// treated as Idle and reset on the next query.
pub struct DragGate<C: Clock> {
    phase: RwLock<DragPhase>,
    clock: Arc<C>,
    timeout: Duration,
}

impl<C: Clock> DragGate<C> {
    /// Creates an idle gate with the given stuck-flag timeout.
    #[must_use]
    pub const fn new(clock: Arc<C>, timeout: Duration) -> Self {
        Self {
            phase: RwLock::new(DragPhase::Idle),
            clock,
            timeout,
        }
    }

    /// Enters the Dragging phase.
    pub fn begin(&self) {
        let started_at = self.clock.utc();
        *self.phase.write().unwrap_or_else(PoisonError::into_inner) =
            DragPhase::Dragging { started_at };
    }

    /// Returns to the Idle phase.
    pub fn finish(&self) {
        *self.phase.write().unwrap_or_else(PoisonError::into_inner) = DragPhase::Idle;
    }

    /// Returns whether a drag gesture is currently in flight.
    ///
    /// A stale Dragging phase is reset as a side effect.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let phase = *self.phase.read().unwrap_or_else(PoisonError::into_inner);
        match phase {
            DragPhase::Idle => false,
            DragPhase::Dragging { started_at } => {
                if self.clock.utc() - started_at < self.timeout {
                    true
                } else {
                    tracing::warn!("drag phase exceeded timeout; resetting stuck gate");
                    self.finish();
                    false
                }
            }
        }
    }
}

/// A position within the board: a column and an index inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragPosition {
    /// Column identifier.
    pub column: ColumnId,
    /// Index within the column's task vector.
    pub index: usize,
}

impl DragPosition {
    /// Creates a position.
    #[must_use]
    pub const fn new(column: ColumnId, index: usize) -> Self {
        Self { column, index }
    }
}

/// Description of a completed drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragDrop {
    /// Task that was dragged.
    pub task_id: TaskId,
    /// Where the gesture started.
    pub source: DragPosition,
    /// Where the task was dropped, or `None` when released outside any
    /// column.
    pub destination: Option<DragPosition>,
}

impl DragDrop {
    /// Creates a drop description with no destination.
    #[must_use]
    pub const fn new(task_id: TaskId, source: DragPosition) -> Self {
        Self {
            task_id,
            source,
            destination: None,
        }
    }

    /// Sets the drop destination.
    #[must_use]
    pub const fn with_destination(mut self, destination: DragPosition) -> Self {
        self.destination = Some(destination);
        self
    }
}

/// How a drag gesture was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Nothing happened: no destination, same position, or unknown task.
    NoChange,
    /// The move was applied locally and persisted remotely.
    Moved,
    /// The remote write failed; the pre-drag state was restored.
    RolledBack,
    /// The task had been deleted remotely; it was purged locally.
    TaskRemoved,
}

/// Applies drag gestures optimistically and reconciles them with the
/// remote store.
pub struct DragReconciler<R, N, C>
where
    R: RemoteTasks,
    N: BoardNotifier,
    C: Clock,
{
    store: Arc<BoardStateStore<C>>,
    remote: Arc<R>,
    notifier: Arc<N>,
    gate: Arc<DragGate<C>>,
}

impl<R, N, C> DragReconciler<R, N, C>
where
    R: RemoteTasks,
    N: BoardNotifier,
    C: Clock,
{
    /// Creates a reconciler settling gestures against the given store.
    ///
    /// The gate must be the same one the store consults, or suppression
    /// will not cover in-flight gestures.
    #[must_use]
    pub const fn new(
        store: Arc<BoardStateStore<C>>,
        remote: Arc<R>,
        notifier: Arc<N>,
        gate: Arc<DragGate<C>>,
    ) -> Self {
        Self {
            store,
            remote,
            notifier,
            gate,
        }
    }

    /// Returns the gate guarding this reconciler's gestures.
    #[must_use]
    pub const fn gate(&self) -> &Arc<DragGate<C>> {
        &self.gate
    }

    /// Marks the start of a drag gesture, suppressing task snapshots.
    pub fn drag_started(&self) {
        self.gate.begin();
    }

    /// Settles a completed drag gesture.
    ///
    /// The gate stays active until settlement finishes, so snapshots
    /// arriving while the remote write is in flight cannot revert the
    /// optimistic move.
    pub async fn drag_ended(&self, drop: DragDrop) -> DragOutcome {
        let outcome = self.settle(drop).await;
        self.gate.finish();
        outcome
    }

    async fn settle(&self, drop: DragDrop) -> DragOutcome {
        let Some(destination) = drop.destination else {
            return DragOutcome::NoChange;
        };
        if destination.column == drop.source.column && destination.index == drop.source.index {
            return DragOutcome::NoChange;
        }

        let state = self.store.snapshot();
        let Some(task_title) = state.task(drop.task_id).map(|task| task.title().to_owned())
        else {
            return DragOutcome::NoChange;
        };
        let Some(column_title) = state
            .column(destination.column)
            .map(|column| column.title().to_owned())
        else {
            return DragOutcome::NoChange;
        };

        // Exact pre-drag projection, restored verbatim on failure.
        let before = self.store.columns_snapshot();

        if !self
            .store
            .move_task(drop.task_id, destination.column, destination.index)
        {
            return DragOutcome::NoChange;
        }

        // The task may have been deleted on another device while the
        // gesture was in flight; writing would resurrect nothing and fail.
        match self.remote.fetch_task(drop.task_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return self.purge_vanished(drop.task_id, task_title),
            Err(err) => {
                tracing::warn!(task = %drop.task_id, error = %err, "pre-move existence check failed");
                return self.roll_back(before);
            }
        }

        let patch = TaskPatch::new().with_column(destination.column);
        match self.remote.update_task(drop.task_id, patch).await {
            Ok(()) => {
                self.notifier.notify(Notice::TaskMoved {
                    title: task_title,
                    column: column_title,
                });
                DragOutcome::Moved
            }
            Err(err) if err.is_not_found() => self.purge_vanished(drop.task_id, task_title),
            Err(err) => {
                tracing::warn!(task = %drop.task_id, error = %err, "drag move write failed");
                self.roll_back(before)
            }
        }
    }

    fn purge_vanished(&self, task_id: TaskId, title: String) -> DragOutcome {
        self.store.remove_task(task_id);
        self.notifier.notify(Notice::TaskRemovedRemotely { title });
        DragOutcome::TaskRemoved
    }

    fn roll_back(&self, before: Vec<ColumnState>) -> DragOutcome {
        self.store.restore_columns(before);
        self.notifier.notify(Notice::OperationFailed {
            operation: "move the task".to_owned(),
        });
        DragOutcome::RolledBack
    }
}
