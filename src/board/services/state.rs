//! Board state store: the local projection of columns, tasks, and rules.

use mockable::Clock;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use crate::board::domain::{
    Column, ColumnId, ColumnPatch, Rule, RuleId, RulePatch, Task, TaskId, TaskPatch,
};

use super::drag::DragGate;

/// A column together with the tasks currently grouped under it.
///
/// The task vector is a derived projection; the remote column record never
/// carries tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnState {
    column: Column,
    tasks: Vec<Task>,
}

impl ColumnState {
    /// Creates a column projection with no tasks.
    #[must_use]
    pub const fn new(column: Column) -> Self {
        Self {
            column,
            tasks: Vec::new(),
        }
    }

    /// Returns the column metadata.
    #[must_use]
    pub const fn column(&self) -> &Column {
        &self.column
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.column.id()
    }

    /// Returns the column display title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.column.title()
    }

    /// Returns the tasks grouped under the column, in board order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

/// The full local board projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    columns: Vec<ColumnState>,
    rules: Vec<Rule>,
    selected: Option<TaskId>,
}

impl BoardState {
    /// Creates an empty board.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
            rules: Vec::new(),
            selected: None,
        }
    }

    /// Returns the columns in board order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnState] {
        &self.columns
    }

    /// Returns the automation rules in creation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the identifier of the open task, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<TaskId> {
        self.selected
    }

    /// Looks up a column projection by identifier.
    #[must_use]
    pub fn column(&self, id: ColumnId) -> Option<&ColumnState> {
        self.columns.iter().find(|column| column.id() == id)
    }

    /// Looks up a task anywhere on the board.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.columns
            .iter()
            .flat_map(|column| column.tasks.iter())
            .find(|task| task.id() == id)
    }

    /// Resolves the open task, if it is still on the board.
    ///
    /// A selection pointing at a task no longer present resolves to `None`
    /// rather than surfacing stale data.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.selected.and_then(|id| self.task(id))
    }

    /// Returns every task identifier currently on the board.
    #[must_use]
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.columns
            .iter()
            .flat_map(|column| column.tasks.iter())
            .map(Task::id)
            .collect()
    }

    fn find_task_position(&self, id: TaskId) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(col_idx, column)| {
            column
                .tasks
                .iter()
                .position(|task| task.id() == id)
                .map(|task_idx| (col_idx, task_idx))
        })
    }
}

/// Outcome of offering an externally-sourced snapshot to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotApplication {
    /// The snapshot replaced the relevant projection.
    Applied,
    /// A drag gesture is in flight; the snapshot was discarded. The feed is
    /// state-based, so the next snapshot restores convergence.
    Suppressed,
}

/// Shared, whole-state-replacement store for the board projection.
///
/// Every mutation clones the previous state, transforms the clone, and
/// swaps it in under a single lock, so interleaved async callers never
/// observe or produce torn state. Externally-sourced task snapshots consult
/// the drag gate before being applied.
pub struct BoardStateStore<C: Clock> {
    state: RwLock<BoardState>,
    gate: Arc<DragGate<C>>,
}

impl<C: Clock> BoardStateStore<C> {
    /// Creates an empty store guarded by the given drag gate.
    #[must_use]
    pub const fn new(gate: Arc<DragGate<C>>) -> Self {
        Self {
            state: RwLock::new(BoardState::new()),
            gate,
        }
    }

    /// Returns a copy of the current board state.
    #[must_use]
    pub fn snapshot(&self) -> BoardState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns a copy of the current column projections.
    #[must_use]
    pub fn columns_snapshot(&self) -> Vec<ColumnState> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .columns
            .clone()
    }

    // The single mutation primitive: transform a clone of the previous
    // state, then swap. A panicking transform leaves the store untouched.
    fn replace<R>(&self, transform: impl FnOnce(&mut BoardState) -> R) -> R {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.clone();
        let outcome = transform(&mut next);
        *guard = next;
        outcome
    }

    /// Sets or clears the open task.
    pub fn select(&self, task: Option<TaskId>) {
        self.replace(|state| state.selected = task);
    }

    /// Applies a remote task snapshot, re-grouping every column's tasks.
    ///
    /// Tasks are grouped by column identifier in snapshot order; tasks
    /// referencing a column not on the board are dropped from the
    /// projection until a column snapshot catches up. Returns
    /// [`SnapshotApplication::Suppressed`] without touching state while a
    /// drag gesture is in flight.
    pub fn apply_task_snapshot(&self, tasks: Vec<Task>) -> SnapshotApplication {
        if self.gate.is_active() {
            return SnapshotApplication::Suppressed;
        }
        self.replace(|state| {
            for column in &mut state.columns {
                column.tasks.clear();
            }
            for task in tasks {
                if let Some(column) = state
                    .columns
                    .iter_mut()
                    .find(|column| column.id() == task.column_id())
                {
                    column.tasks.push(task);
                }
                // Tasks referencing an unknown column stay out of the
                // projection until a column snapshot catches up.
            }
        });
        SnapshotApplication::Applied
    }

    /// Applies a remote column snapshot, preserving each surviving
    /// column's current local task vector.
    pub fn apply_column_snapshot(&self, columns: Vec<Column>) {
        self.replace(|state| {
            let next: Vec<ColumnState> = columns
                .into_iter()
                .map(|column| {
                    let tasks = state
                        .columns
                        .iter()
                        .find(|existing| existing.id() == column.id())
                        .map(|existing| existing.tasks.clone())
                        .unwrap_or_default();
                    ColumnState { column, tasks }
                })
                .collect();
            state.columns = next;
        });
    }

    /// Applies a remote rule snapshot.
    pub fn apply_rule_snapshot(&self, rules: Vec<Rule>) {
        self.replace(|state| state.rules = rules);
    }

    /// Appends a task to its column, if that column is on the board.
    pub fn insert_task(&self, task: Task) {
        self.replace(|state| {
            if let Some(column) = state
                .columns
                .iter_mut()
                .find(|column| column.id() == task.column_id())
            {
                column.tasks.push(task);
            }
        });
    }

    /// Applies a patch to a task in place, re-grouping when the patch moves
    /// it to another column.
    pub fn update_task(&self, id: TaskId, patch: &TaskPatch) {
        self.replace(|state| {
            let Some((col_idx, task_idx)) = state.find_task_position(id) else {
                return;
            };
            let Some((source_id, mut task)) = state
                .columns
                .get_mut(col_idx)
                .map(|source| (source.id(), source.tasks.remove(task_idx)))
            else {
                return;
            };
            task.apply(patch);
            let destination = task.column_id();
            if destination == source_id {
                if let Some(source) = state.columns.get_mut(col_idx) {
                    let slot = task_idx.min(source.tasks.len());
                    source.tasks.insert(slot, task);
                }
            } else if let Some(target) = state
                .columns
                .iter_mut()
                .find(|candidate| candidate.id() == destination)
            {
                target.tasks.push(task);
            }
            // A patch pointing at an unknown column drops the task from the
            // projection; the next snapshot re-groups it.
        });
    }

    /// Removes a task from every column and clears a matching selection.
    ///
    /// Returns whether the task was present.
    pub fn remove_task(&self, id: TaskId) -> bool {
        self.replace(|state| {
            let mut removed = false;
            for column in &mut state.columns {
                let before = column.tasks.len();
                column.tasks.retain(|task| task.id() != id);
                removed |= column.tasks.len() != before;
            }
            if removed && state.selected == Some(id) {
                state.selected = None;
            }
            removed
        })
    }

    /// Moves a task to a destination column at the given index, re-keying
    /// it to the destination.
    ///
    /// The index is clamped to the destination length. Returns `false`
    /// without changing state when the task or destination is unknown.
    pub fn move_task(&self, id: TaskId, destination: ColumnId, index: usize) -> bool {
        self.replace(|state| {
            let Some(target_idx) = state
                .columns
                .iter()
                .position(|column| column.id() == destination)
            else {
                return false;
            };
            let Some((col_idx, task_idx)) = state.find_task_position(id) else {
                return false;
            };
            let Some(mut task) = state
                .columns
                .get_mut(col_idx)
                .map(|source| source.tasks.remove(task_idx))
            else {
                return false;
            };
            task.move_to_column(destination);
            if let Some(target) = state.columns.get_mut(target_idx) {
                let slot = index.min(target.tasks.len());
                target.tasks.insert(slot, task);
                true
            } else {
                false
            }
        })
    }

    /// Restores a previously captured column projection verbatim.
    pub fn restore_columns(&self, columns: Vec<ColumnState>) {
        self.replace(|state| state.columns = columns);
    }

    /// Appends a column to the board.
    pub fn add_column(&self, column: Column) {
        self.replace(|state| state.columns.push(ColumnState::new(column)));
    }

    /// Applies a patch to a column's metadata.
    pub fn update_column(&self, id: ColumnId, patch: &ColumnPatch) {
        self.replace(|state| {
            if let Some(target) = state.columns.iter_mut().find(|column| column.id() == id) {
                target.column.apply(patch);
            }
        });
    }

    /// Removes a column from the board.
    ///
    /// Returns whether the column was present.
    pub fn remove_column(&self, id: ColumnId) -> bool {
        self.replace(|state| {
            let before = state.columns.len();
            state.columns.retain(|column| column.id() != id);
            state.columns.len() != before
        })
    }

    /// Appends a rule to the board.
    pub fn add_rule(&self, rule: Rule) {
        self.replace(|state| state.rules.push(rule));
    }

    /// Applies a patch to a rule.
    pub fn update_rule(&self, id: RuleId, patch: &RulePatch) {
        self.replace(|state| {
            if let Some(target) = state.rules.iter_mut().find(|rule| rule.id() == id) {
                target.apply(patch);
            }
        });
    }

    /// Removes a rule from the board.
    pub fn remove_rule(&self, id: RuleId) {
        self.replace(|state| state.rules.retain(|rule| rule.id() != id));
    }

    /// Drops every task whose identifier is not in `keep`, clearing the
    /// selection when it pointed at a dropped task.
    ///
    /// Returns the purged identifiers.
    pub fn retain_tasks(&self, keep: &HashSet<TaskId>) -> Vec<TaskId> {
        self.replace(|state| {
            let mut purged = Vec::new();
            for column in &mut state.columns {
                column.tasks.retain(|task| {
                    let kept = keep.contains(&task.id());
                    if !kept {
                        purged.push(task.id());
                    }
                    kept
                });
            }
            if let Some(selected) = state.selected {
                if purged.contains(&selected) {
                    state.selected = None;
                }
            }
            purged
        })
    }
}
