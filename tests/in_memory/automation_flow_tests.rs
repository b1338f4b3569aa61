//! Automation round-trips: intents fire, remote state converges, loops end.

use chrono::{Duration, Utc};

use boardsync::board::domain::{NewTask, Subtask, TaskPatch};

use super::helpers::{signed_in_stack, StackEngine};

#[tokio::test(flavor = "multi_thread")]
async fn an_overdue_task_round_trips_into_blocked_exactly_once() {
    let stack = signed_in_stack();
    stack
        .lifecycle
        .initial_load()
        .await
        .expect("load")
        .expect("signed in");
    let todo = stack.column_id("To Do");
    let task = stack
        .lifecycle
        .create_task(
            NewTask::new("Pay invoices", todo).with_due_date(Utc::now() - Duration::days(1)),
        )
        .await
        .expect("create");

    let applied = stack.engine.run_once().await;
    assert_eq!(applied.len(), 1, "one intent for the overdue task");
    assert_eq!(applied.first().expect("intent").task_id, task);

    // Simulate the snapshot flowing back from the remote store.
    stack.pump_tasks().await;
    assert_eq!(stack.column_of(task).as_deref(), Some("Blocked"));
    assert!(stack.notifier.notices().iter().any(|notice| matches!(
        notice,
        boardsync::board::ports::Notice::TaskMovedByRule { column, .. } if column == "Blocked"
    )));

    // Converged: the task sits in the rule's target, so nothing re-fires.
    let state = stack.store.snapshot();
    assert!(StackEngine::evaluate(&state, Utc::now()).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn completing_the_last_subtask_triggers_the_configured_move() {
    let stack = signed_in_stack();
    stack
        .lifecycle
        .initial_load()
        .await
        .expect("load")
        .expect("signed in");
    let todo = stack.column_id("To Do");
    let task = stack
        .lifecycle
        .create_task(NewTask::new("Release", todo).with_subtasks([
            Subtask::new("Tag the build").with_completed(true),
            Subtask::new("Write the notes").with_completed(true),
            Subtask::new("Announce it"),
        ]))
        .await
        .expect("create");

    assert!(
        stack.engine.run_once().await.is_empty(),
        "two of three subtasks is not enough"
    );

    let completed: Vec<Subtask> = stack
        .store
        .snapshot()
        .task(task)
        .expect("task on the board")
        .subtasks()
        .iter()
        .cloned()
        .map(|mut subtask| {
            subtask.set_completed(true);
            subtask
        })
        .collect();
    stack
        .lifecycle
        .update_task(task, TaskPatch::new().with_subtasks(completed))
        .await
        .expect("complete checklist");

    let applied = stack.engine.run_once().await;
    assert_eq!(applied.len(), 1);

    stack.pump_tasks().await;
    assert_eq!(stack.column_of(task).as_deref(), Some("Completed"));
}
