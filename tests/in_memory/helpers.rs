//! Shared test helpers for in-memory board integration tests.

use std::sync::Arc;
use std::time::Duration;

use boardsync::board::{
    adapters::memory::{InMemoryIdentityProvider, InMemoryRemoteStore, RecordingNotifier},
    domain::{ColumnId, OwnerId, TaskId},
    ports::{RemoteTasks, UserProfile},
    services::{
        BoardConfig, BoardLifecycleService, BoardStateStore, DragGate, DragReconciler,
        OrphanReconciler, RuleEngine,
    },
};
use mockable::DefaultClock;

/// Lifecycle service type used by the integration stack.
pub type StackLifecycle = BoardLifecycleService<
    InMemoryRemoteStore<DefaultClock>,
    InMemoryIdentityProvider,
    RecordingNotifier,
    DefaultClock,
>;

/// Rule engine type used by the integration stack.
pub type StackEngine = RuleEngine<InMemoryRemoteStore<DefaultClock>, RecordingNotifier, DefaultClock>;

/// Drag reconciler type used by the integration stack.
pub type StackReconciler =
    DragReconciler<InMemoryRemoteStore<DefaultClock>, RecordingNotifier, DefaultClock>;

/// Orphan reconciler type used by the integration stack.
pub type StackOrphans = OrphanReconciler<InMemoryRemoteStore<DefaultClock>, DefaultClock>;

/// A complete board stack wired over the in-memory adapters.
pub struct BoardStack {
    pub owner: OwnerId,
    pub remote: Arc<InMemoryRemoteStore<DefaultClock>>,
    pub store: Arc<BoardStateStore<DefaultClock>>,
    pub gate: Arc<DragGate<DefaultClock>>,
    pub notifier: Arc<RecordingNotifier>,
    pub lifecycle: StackLifecycle,
    pub engine: Arc<StackEngine>,
    pub reconciler: StackReconciler,
    pub orphans: StackOrphans,
}

/// Builds a stack with a signed-in user and an empty remote store.
pub fn signed_in_stack() -> BoardStack {
    let clock = Arc::new(DefaultClock);
    build_stack(
        Arc::new(InMemoryRemoteStore::new(clock)),
        OwnerId::new(),
    )
}

/// Builds a second stack over an existing remote store, as another device
/// signed in as the same user would.
pub fn attach_stack(remote: &Arc<InMemoryRemoteStore<DefaultClock>>, owner: OwnerId) -> BoardStack {
    build_stack(Arc::clone(remote), owner)
}

fn build_stack(remote: Arc<InMemoryRemoteStore<DefaultClock>>, owner: OwnerId) -> BoardStack {
    let clock = Arc::new(DefaultClock);
    let config = BoardConfig::new();
    let gate = Arc::new(DragGate::new(Arc::clone(&clock), config.drag_timeout()));
    let store = Arc::new(BoardStateStore::new(Arc::clone(&gate)));
    let notifier = Arc::new(RecordingNotifier::new());
    let identity = Arc::new(InMemoryIdentityProvider::signed_in(
        UserProfile::new(owner).with_display_name("Integration"),
    ));

    let lifecycle = BoardLifecycleService::new(
        Arc::clone(&store),
        Arc::clone(&remote),
        identity,
        Arc::clone(&notifier),
        Arc::clone(&clock),
    );
    let engine = Arc::new(RuleEngine::new(
        Arc::clone(&store),
        Arc::clone(&remote),
        Arc::clone(&notifier),
        Arc::clone(&clock),
        config.rule_cooldown(),
    ));
    let reconciler = DragReconciler::new(
        Arc::clone(&store),
        Arc::clone(&remote),
        Arc::clone(&notifier),
        Arc::clone(&gate),
    );
    let orphans = OrphanReconciler::new(
        Arc::clone(&store),
        Arc::clone(&remote),
        config.orphan_interval(),
    );

    BoardStack {
        owner,
        remote,
        store,
        gate,
        notifier,
        lifecycle,
        engine,
        reconciler,
        orphans,
    }
}

impl BoardStack {
    /// Resolves a seeded column id by title.
    ///
    /// # Panics
    ///
    /// Panics when no column with the title is on the board.
    pub fn column_id(&self, title: &str) -> ColumnId {
        self.store
            .snapshot()
            .columns()
            .iter()
            .find(|column| column.title() == title)
            .unwrap_or_else(|| panic!("column {title} on the board"))
            .id()
    }

    /// Title of the column a task currently sits in, if any.
    pub fn column_of(&self, task: TaskId) -> Option<String> {
        let state = self.store.snapshot();
        let column_id = state.task(task)?.column_id();
        state
            .column(column_id)
            .map(|column| column.title().to_owned())
    }

    /// Mirrors the remote task list into the local store, as a snapshot
    /// delivery would.
    ///
    /// # Panics
    ///
    /// Panics when the remote fetch fails.
    pub async fn pump_tasks(&self) {
        let tasks = self
            .remote
            .fetch_tasks(self.owner)
            .await
            .expect("fetch tasks");
        self.store.apply_task_snapshot(tasks);
    }
}

/// Polls until `probe` returns true or the timeout elapses.
pub async fn wait_until(probe: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if probe() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
