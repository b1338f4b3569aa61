//! Boardsync: client-side reconciliation core for a kanban board.
//!
//! This crate keeps an in-memory kanban board consistent with a hosted
//! document database: optimistic drag-and-drop moves, full-state snapshot
//! feeds, declarative automation rules, and an orphan sweep all mutate one
//! shared projection without lost updates or move loops.
//!
//! # Architecture
//!
//! Boardsync follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the hosted database, the
//!   identity provider, and the notification surface
//! - **Adapters**: Concrete implementations of ports (in-memory doubles
//!   for tests and simulation)
//!
//! # Modules
//!
//! - [`board`]: Board state, drag reconciliation, rule engine, sync session

pub mod board;
