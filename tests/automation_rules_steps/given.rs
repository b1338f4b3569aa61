//! Given steps for automation rule BDD scenarios.

use super::world::{run_async, AutomationWorld};
use boardsync::board::domain::{NewTask, Rule, Subtask, TaskPatch};
use chrono::{Duration, Utc};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given("a freshly seeded board")]
fn freshly_seeded_board(world: &mut AutomationWorld) -> Result<(), eyre::Report> {
    let report = run_async(world.lifecycle.initial_load())
        .wrap_err("initial load for automation scenario")?
        .ok_or_else(|| eyre::eyre!("scenario world has no signed-in user"))?;
    if !report.seeded_columns || !report.seeded_rules {
        return Err(eyre::eyre!("expected a first-login board, got {report:?}"));
    }
    Ok(())
}

#[given(r#"a task "{title}" in "{column}" that became due yesterday"#)]
fn overdue_task(
    world: &mut AutomationWorld,
    title: String,
    column: String,
) -> Result<(), eyre::Report> {
    let column_id = world
        .column_id(&column)
        .ok_or_else(|| eyre::eyre!("column {column} is not on the board"))?;
    let draft = NewTask::new(title, column_id).with_due_date(Utc::now() - Duration::days(1));
    let id = run_async(world.lifecycle.create_task(draft))
        .wrap_err("create overdue task for scenario")?;
    world.task = Some(id);
    Ok(())
}

#[given(r#"a task "{title}" in "{column}" with 2 of 3 subtasks completed"#)]
fn partially_completed_task(
    world: &mut AutomationWorld,
    title: String,
    column: String,
) -> Result<(), eyre::Report> {
    let column_id = world
        .column_id(&column)
        .ok_or_else(|| eyre::eyre!("column {column} is not on the board"))?;
    let draft = NewTask::new(title, column_id).with_subtasks([
        Subtask::new("Step one").with_completed(true),
        Subtask::new("Step two").with_completed(true),
        Subtask::new("Step three"),
    ]);
    let id = run_async(world.lifecycle.create_task(draft))
        .wrap_err("create checklist task for scenario")?;
    world.task = Some(id);
    Ok(())
}

#[given("the final subtask is completed")]
fn final_subtask_completed(world: &mut AutomationWorld) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .ok_or_else(|| eyre::eyre!("missing scenario task"))?;
    let completed: Vec<Subtask> = world
        .store
        .snapshot()
        .task(task_id)
        .ok_or_else(|| eyre::eyre!("scenario task is not on the board"))?
        .subtasks()
        .iter()
        .cloned()
        .map(|mut subtask| {
            subtask.set_completed(true);
            subtask
        })
        .collect();
    run_async(
        world
            .lifecycle
            .update_task(task_id, TaskPatch::new().with_subtasks(completed)),
    )
    .wrap_err("complete the checklist for scenario")?;
    Ok(())
}

#[given("every rule is disabled")]
fn every_rule_disabled(world: &mut AutomationWorld) -> Result<(), eyre::Report> {
    let rules: Vec<_> = world
        .store
        .snapshot()
        .rules()
        .iter()
        .map(Rule::id)
        .collect();
    for rule in rules {
        run_async(world.lifecycle.set_rule_enabled(rule, false))
            .wrap_err("disable rule for scenario")?;
    }
    Ok(())
}
