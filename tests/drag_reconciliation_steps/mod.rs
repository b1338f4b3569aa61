//! Step definitions for drag reconciliation BDD scenarios.

pub mod world;
