//! Shared world state for automation rule BDD scenarios.

use std::sync::Arc;

use boardsync::board::{
    adapters::memory::{InMemoryIdentityProvider, InMemoryRemoteStore, RecordingNotifier},
    domain::{ColumnId, MoveIntent, OwnerId, TaskId},
    ports::UserProfile,
    services::{BoardConfig, BoardLifecycleService, BoardStateStore, DragGate, RuleEngine},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Lifecycle service type used by the BDD world.
pub type WorldLifecycle = BoardLifecycleService<
    InMemoryRemoteStore<DefaultClock>,
    InMemoryIdentityProvider,
    RecordingNotifier,
    DefaultClock,
>;

/// Rule engine type used by the BDD world.
pub type WorldEngine = RuleEngine<InMemoryRemoteStore<DefaultClock>, RecordingNotifier, DefaultClock>;

/// Scenario world for automation behaviour tests.
pub struct AutomationWorld {
    /// Owner identity the board is loaded for.
    pub owner: OwnerId,
    /// In-memory stand-in for the hosted document store.
    pub remote: Arc<InMemoryRemoteStore<DefaultClock>>,
    /// Local board projection.
    pub store: Arc<BoardStateStore<DefaultClock>>,
    /// Lifecycle service driving loads and CRUD.
    pub lifecycle: WorldLifecycle,
    /// Rule engine under test.
    pub engine: WorldEngine,
    /// Task created by the scenario, if any.
    pub task: Option<TaskId>,
    /// Intents dispatched by the last engine pass.
    pub last_applied: Option<Vec<MoveIntent>>,
}

impl AutomationWorld {
    /// Creates a world with a signed-in user and an empty remote store.
    #[must_use]
    pub fn new() -> Self {
        let owner = OwnerId::new();
        let clock = Arc::new(DefaultClock);
        let config = BoardConfig::new();
        let remote = Arc::new(InMemoryRemoteStore::new(Arc::clone(&clock)));
        let gate = Arc::new(DragGate::new(Arc::clone(&clock), config.drag_timeout()));
        let store = Arc::new(BoardStateStore::new(Arc::clone(&gate)));
        let notifier = Arc::new(RecordingNotifier::new());
        let identity = Arc::new(InMemoryIdentityProvider::signed_in(
            UserProfile::new(owner).with_display_name("Scenario"),
        ));

        let lifecycle = BoardLifecycleService::new(
            Arc::clone(&store),
            Arc::clone(&remote),
            identity,
            Arc::clone(&notifier),
            Arc::clone(&clock),
        );
        let engine = RuleEngine::new(
            Arc::clone(&store),
            Arc::clone(&remote),
            Arc::clone(&notifier),
            clock,
            config.rule_cooldown(),
        );

        Self {
            owner,
            remote,
            store,
            lifecycle,
            engine,
            task: None,
            last_applied: None,
        }
    }

    /// Resolves a column id by display title.
    pub fn column_id(&self, title: &str) -> Option<ColumnId> {
        self.store
            .snapshot()
            .columns()
            .iter()
            .find(|column| column.title() == title)
            .map(boardsync::board::services::ColumnState::id)
    }

    /// Title of the column the scenario task sits in, if any.
    pub fn task_column_title(&self) -> Option<String> {
        let state = self.store.snapshot();
        let column_id = state.task(self.task?)?.column_id();
        state
            .column(column_id)
            .map(|column| column.title().to_owned())
    }
}

impl Default for AutomationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> AutomationWorld {
    AutomationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
