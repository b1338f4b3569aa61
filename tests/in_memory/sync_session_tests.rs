//! Live feed behaviour: automation over snapshots, drag suppression,
//! one-time fallback reload.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use boardsync::board::{
    domain::{NewTask, TaskId},
    ports::RemoteTasks,
    services::{DragDrop, DragOutcome, DragPosition, SyncSession},
};

use super::helpers::{signed_in_stack, wait_until, BoardStack};

const CONVERGENCE: Duration = Duration::from_secs(2);

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_live_feed_moves_overdue_tasks_without_local_involvement() {
    let stack = signed_in_stack();
    stack
        .lifecycle
        .initial_load()
        .await
        .expect("load")
        .expect("signed in");
    let todo = stack.column_id("To Do");

    let session = SyncSession::spawn(
        stack.owner,
        Arc::clone(&stack.store),
        Arc::clone(&stack.remote),
        Arc::clone(&stack.engine),
    );

    // Another device creates an overdue task; the snapshot feed delivers
    // it, the engine fires, and the move round-trips back.
    let task = stack
        .remote
        .create_task(
            stack.owner,
            NewTask::new("Pay invoices", todo)
                .with_due_date(Utc::now() - chrono::Duration::days(1)),
        )
        .await
        .expect("remote create");

    let converged = wait_until(
        || stack.column_of(task).as_deref() == Some("Blocked"),
        CONVERGENCE,
    )
    .await;
    session.shutdown();
    assert!(converged, "overdue task should end up in Blocked");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn snapshots_are_suppressed_while_a_gesture_is_in_flight() {
    let stack = signed_in_stack();
    stack
        .lifecycle
        .initial_load()
        .await
        .expect("load")
        .expect("signed in");
    let todo = stack.column_id("To Do");
    let anchor = stack
        .lifecycle
        .create_task(NewTask::new("Anchor", todo))
        .await
        .expect("create");

    let session = SyncSession::spawn(
        stack.owner,
        Arc::clone(&stack.store),
        Arc::clone(&stack.remote),
        Arc::clone(&stack.engine),
    );

    stack.reconciler.drag_started();
    let missed = stack
        .remote
        .create_task(stack.owner, NewTask::new("Missed while dragging", todo))
        .await
        .expect("remote create");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(
        stack.store.snapshot().task(missed).is_none(),
        "the feed must not touch the board mid-gesture"
    );

    let outcome = stack
        .reconciler
        .drag_ended(DragDrop::new(anchor, DragPosition::new(todo, 0)))
        .await;
    assert_eq!(outcome, DragOutcome::NoChange);
    assert!(!stack.gate.is_active(), "gate released after settlement");

    // The suppressed snapshot is gone for good; the next remote change
    // carries the full state and heals the projection.
    let healer = stack
        .remote
        .create_task(stack.owner, NewTask::new("After the drag", todo))
        .await
        .expect("remote create");
    let converged = wait_until(
        || {
            let state = stack.store.snapshot();
            state.task(missed).is_some() && state.task(healer).is_some()
        },
        CONVERGENCE,
    )
    .await;
    session.shutdown();
    assert!(converged, "state-based feed heals after the gesture");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_feed_failure_triggers_a_one_time_manual_reload() {
    let stack = signed_in_stack();
    stack
        .lifecycle
        .initial_load()
        .await
        .expect("load")
        .expect("signed in");
    let todo = stack.column_id("To Do");

    // Created while nobody is subscribed: the feed never announces it.
    let missed = stack
        .remote
        .create_task(stack.owner, NewTask::new("Unannounced", todo))
        .await
        .expect("remote create");

    let session = SyncSession::spawn(
        stack.owner,
        Arc::clone(&stack.store),
        Arc::clone(&stack.remote),
        Arc::clone(&stack.engine),
    );
    assert!(stack.store.snapshot().task(missed).is_none());

    // The listener may still be subscribing; keep injecting until the
    // fallback reload lands.
    let converged = wait_until_with_errors(&stack, missed).await;
    session.shutdown();
    assert!(converged, "fallback reload should recover the missed task");
}

async fn wait_until_with_errors(stack: &BoardStack, task: TaskId) -> bool {
    let deadline = tokio::time::Instant::now() + CONVERGENCE;
    loop {
        stack.remote.emit_task_feed_error(stack.owner);
        if stack.store.snapshot().task(task).is_some() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
