//! Kanban board reconciliation core.
//!
//! This module keeps a local board projection consistent with a hosted
//! document store under three concurrent influences: remote snapshot
//! feeds, optimistic drag-and-drop moves, and automation rules whose moves
//! round-trip through the remote store. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Reconciliation services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
