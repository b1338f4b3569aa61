//! Port contracts for the board core.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod identity;
pub mod notifier;
pub mod remote;

pub use identity::{IdentityError, IdentityProvider, UserProfile};
pub use notifier::{BoardNotifier, Notice};
pub use remote::{
    RemoteBoard, RemoteColumns, RemoteResult, RemoteRules, RemoteStoreError, RemoteTasks,
    SnapshotEvent,
};
