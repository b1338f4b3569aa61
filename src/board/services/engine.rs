//! Automation rule engine: pure evaluation plus fire-and-forget application.

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use crate::board::{
    domain::{MoveIntent, TaskPatch},
    ports::{BoardNotifier, Notice, RemoteTasks},
};

use super::state::{BoardState, BoardStateStore};

/// Evaluates enabled rules against the board and applies the derived
/// move-intents as remote updates.
///
/// Application is intentionally not transactional: every intent is written
/// as an independent spawned future with its own error handling, so one
/// transient failure never blocks the rest. Moves come back through the
/// snapshot feed; the engine never touches local state.
pub struct RuleEngine<R, N, C>
where
    R: RemoteTasks,
    N: BoardNotifier,
    C: Clock,
{
    store: Arc<BoardStateStore<C>>,
    remote: Arc<R>,
    notifier: Arc<N>,
    clock: Arc<C>,
    cooldown: Duration,
    recently_fired: RwLock<HashMap<MoveIntent, DateTime<Utc>>>,
}

impl<R, N, C> RuleEngine<R, N, C>
where
    R: RemoteTasks + 'static,
    N: BoardNotifier + 'static,
    C: Clock + Send + Sync,
{
    /// Creates an engine with the given re-fire cool-down window.
    #[must_use]
    pub fn new(
        store: Arc<BoardStateStore<C>>,
        remote: Arc<R>,
        notifier: Arc<N>,
        clock: Arc<C>,
        cooldown: Duration,
    ) -> Self {
        Self {
            store,
            remote,
            notifier,
            clock,
            cooldown,
            recently_fired: RwLock::new(HashMap::new()),
        }
    }

    /// Derives the move-intents the enabled rules imply for the board.
    ///
    /// Pure over its inputs: two passes over unchanged state produce
    /// identical intent sets. Intents are deduplicated within the pass, so
    /// several rules agreeing on the same (task, target) yield exactly one
    /// intent. A rule whose target column is unknown, or whose target the
    /// task already occupies, yields nothing.
    #[must_use]
    pub fn evaluate(state: &BoardState, now: DateTime<Utc>) -> Vec<MoveIntent> {
        let mut seen = HashSet::new();
        let mut intents = Vec::new();
        for column in state.columns() {
            for task in column.tasks() {
                for rule in state.rules().iter().filter(|rule| rule.enabled()) {
                    let target = rule.action().target_column();
                    if target == task.column_id() || state.column(target).is_none() {
                        continue;
                    }
                    if !rule.condition().is_met(task, column.title(), now) {
                        continue;
                    }
                    let intent = MoveIntent {
                        task_id: task.id(),
                        target,
                    };
                    if seen.insert(intent) {
                        intents.push(intent);
                    }
                }
            }
        }
        intents
    }

    /// Runs one evaluation pass and applies the resulting intents.
    ///
    /// Returns the intents actually dispatched after the cool-down filter.
    /// An intent is marked as fired when dispatched, not when confirmed; a
    /// failed write is retried by a later pass once the window elapses.
    pub async fn run_once(&self) -> Vec<MoveIntent> {
        let state = self.store.snapshot();
        let now = self.clock.utc();
        let intents = Self::evaluate(&state, now);
        let due = self.filter_cooled_down(intents, now);

        let mut handles = Vec::new();
        for &intent in &due {
            let remote = Arc::clone(&self.remote);
            let notifier = Arc::clone(&self.notifier);
            let notice = Self::applied_notice(&state, intent);
            handles.push(tokio::spawn(async move {
                let patch = TaskPatch::new().with_column(intent.target);
                match remote.update_task(intent.task_id, patch).await {
                    Ok(()) => {
                        if let Some(applied) = notice {
                            notifier.notify(applied);
                        }
                    }
                    Err(err) => {
                        // Not user-blocking: the next pass re-derives the
                        // intent once the cool-down elapses.
                        tracing::warn!(task = %intent.task_id, error = %err, "automated move failed");
                    }
                }
            }));
        }
        for handle in handles {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "automated move task aborted");
            }
        }
        due
    }

    fn filter_cooled_down(
        &self,
        intents: Vec<MoveIntent>,
        now: DateTime<Utc>,
    ) -> Vec<MoveIntent> {
        let mut fired = self
            .recently_fired
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let cooldown = self.cooldown;
        fired.retain(|_, at| now - *at < cooldown);
        let due: Vec<MoveIntent> = intents
            .into_iter()
            .filter(|intent| !fired.contains_key(intent))
            .collect();
        for intent in &due {
            fired.insert(*intent, now);
        }
        if due.is_empty() {
            tracing::debug!("no move-intents due this pass");
        }
        due
    }

    fn applied_notice(state: &BoardState, intent: MoveIntent) -> Option<Notice> {
        let title = state.task(intent.task_id)?.title().to_owned();
        let column = state.column(intent.target)?.title().to_owned();
        let rule = state
            .rules()
            .iter()
            .find(|rule| rule.enabled() && rule.action().target_column() == intent.target)
            .map_or_else(|| "automation".to_owned(), |rule| rule.name().to_owned());
        Some(Notice::TaskMovedByRule {
            title,
            column,
            rule,
        })
    }
}
