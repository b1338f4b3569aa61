//! Error types for board domain validation.

use super::ColumnId;
use thiserror::Error;

/// Errors returned while constructing or mutating domain board values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The column title is empty after trimming.
    #[error("column title must not be empty")]
    EmptyColumnTitle,

    /// The column still holds tasks and cannot be removed.
    #[error("column {id} still holds {task_count} task(s)")]
    ColumnNotEmpty {
        /// Column that was targeted for removal.
        id: ColumnId,
        /// Number of tasks still grouped under the column.
        task_count: usize,
    },
}
