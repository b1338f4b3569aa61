//! Application services for board reconciliation.

mod config;
mod drag;
mod engine;
mod lifecycle;
mod orphan;
mod session;
mod state;

pub use config::BoardConfig;
pub use drag::{DragDrop, DragGate, DragOutcome, DragPosition, DragReconciler};
pub use engine::RuleEngine;
pub use lifecycle::{BoardLifecycleService, LifecycleError, LifecycleResult, LoadReport};
pub use orphan::OrphanReconciler;
pub use session::SyncSession;
pub use state::{BoardState, BoardStateStore, ColumnState, SnapshotApplication};
