//! Unit tests for the board reconciliation core.

mod support;
