//! Shared builders and a controllable clock for board tests.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, PoisonError, RwLock};

use crate::board::domain::{Column, ColumnId, NewColumn, NewTask, Task, TaskId};
use crate::board::services::{BoardConfig, BoardStateStore, DragGate};

/// Clock that only moves when a test advances it.
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock fixed at a deterministic instant.
    pub fn fixed() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid fixed test instant");
        Self {
            now: RwLock::new(start),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed manual clock shared by a test.
pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::fixed())
}

/// Drag gate using the default stuck-flag timeout.
pub fn drag_gate(clock: &Arc<ManualClock>) -> Arc<DragGate<ManualClock>> {
    Arc::new(DragGate::new(
        Arc::clone(clock),
        BoardConfig::new().drag_timeout(),
    ))
}

/// Empty store guarded by a fresh gate.
pub fn store_with_gate(
    clock: &Arc<ManualClock>,
) -> (Arc<BoardStateStore<ManualClock>>, Arc<DragGate<ManualClock>>) {
    let gate = drag_gate(clock);
    let store = Arc::new(BoardStateStore::new(Arc::clone(&gate)));
    (store, gate)
}

/// Column with the given title.
pub fn column(clock: &Arc<ManualClock>, title: &str) -> Column {
    NewColumn::new(title)
        .expect("non-empty column title")
        .into_column(ColumnId::new(), &**clock)
}

/// Task grouped under the given column.
pub fn task_in(clock: &Arc<ManualClock>, column: &Column, title: &str) -> Task {
    NewTask::new(title, column.id()).into_task(TaskId::new(), &**clock)
}
