//! Shared world state for drag reconciliation BDD scenarios.

use std::sync::Arc;

use boardsync::board::{
    adapters::memory::{InMemoryIdentityProvider, InMemoryRemoteStore, RecordingNotifier},
    domain::{ColumnId, OwnerId, TaskId},
    ports::UserProfile,
    services::{
        BoardConfig, BoardLifecycleService, BoardStateStore, ColumnState, DragGate, DragOutcome,
        DragReconciler,
    },
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

/// Drag reconciler type used by the BDD world.
pub type WorldReconciler =
    DragReconciler<InMemoryRemoteStore<DefaultClock>, RecordingNotifier, DefaultClock>;

/// Scenario world for drag behaviour tests.
pub struct DragWorld {
    /// Owner identity the board is loaded for.
    pub owner: OwnerId,
    /// In-memory stand-in for the hosted document store.
    pub remote: Arc<InMemoryRemoteStore<DefaultClock>>,
    /// Local board projection.
    pub store: Arc<BoardStateStore<DefaultClock>>,
    /// Notifier recording surfaced notices.
    pub notifier: Arc<RecordingNotifier>,
    /// Lifecycle service driving loads and CRUD.
    pub lifecycle: WorldLifecycle,
    /// Reconciler under test.
    pub reconciler: WorldReconciler,
    /// Task created by the scenario, if any.
    pub task: Option<TaskId>,
    /// Column the scenario task started in.
    pub source: Option<ColumnId>,
    /// Column projection captured just before the drop.
    pub before: Option<Vec<ColumnState>>,
    /// Outcome of the last settled gesture.
    pub outcome: Option<DragOutcome>,
}

impl DragWorld {
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
            clock,
        );
        let reconciler = DragReconciler::new(
            Arc::clone(&store),
            Arc::clone(&remote),
            Arc::clone(&notifier),
            gate,
        );

        Self {
            owner,
            remote,
            store,
            notifier,
            lifecycle,
            reconciler,
            task: None,
            source: None,
            before: None,
            outcome: None,
        }
    }

    /// Resolves a column id by display title.
    pub fn column_id(&self, title: &str) -> Option<ColumnId> {
        self.store
            .snapshot()
            .columns()
            .iter()
            .find(|column| column.title() == title)
            .map(ColumnState::id)
    }
}

impl Default for DragWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DragWorld {
    DragWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
