//! User-visible notice port.

use std::fmt;

/// A user-visible notice emitted by board operations.
///
/// Rendering is left to the embedding surface; the core only classifies and
/// phrases the notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A task was created in a column.
    TaskCreated {
        /// Task title.
        title: String,
        /// Destination column title.
        column: String,
    },
    /// A task was edited.
    TaskUpdated {
        /// Task title.
        title: String,
    },
    /// A task was deleted by the user.
    TaskDeleted,
    /// A task was duplicated.
    TaskDuplicated {
        /// Title of the copy.
        title: String,
    },
    /// A task was moved by a drag gesture.
    TaskMoved {
        /// Task title.
        title: String,
        /// Destination column title.
        column: String,
    },
    /// A task was moved by an automation rule.
    TaskMovedByRule {
        /// Task title.
        title: String,
        /// Destination column title.
        column: String,
        /// Name of the rule that fired.
        rule: String,
    },
    /// A task disappeared remotely while it was being manipulated locally.
    TaskRemovedRemotely {
        /// Task title.
        title: String,
    },
    /// A column was added.
    ColumnAdded {
        /// Column title.
        title: String,
    },
    /// A column was deleted.
    ColumnDeleted {
        /// Column title.
        title: String,
    },
    /// A column could not be deleted because it still holds tasks.
    ColumnNotEmpty {
        /// Column title.
        title: String,
    },
    /// A rule was created.
    RuleCreated {
        /// Rule name.
        name: String,
    },
    /// A rule was deleted.
    RuleDeleted,
    /// The user signed out.
    LoggedOut,
    /// A remote operation failed and was not retried.
    OperationFailed {
        /// Short verb phrase naming the failed operation.
        operation: String,
    },
}

impl Notice {
    /// Returns whether the notice reports a failure.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(
            self,
            Self::TaskRemovedRemotely { .. }
                | Self::ColumnNotEmpty { .. }
                | Self::OperationFailed { .. }
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskCreated { title, column } => {
                write!(f, "\"{title}\" added to {column}")
            }
            Self::TaskUpdated { title } => write!(f, "\"{title}\" has been updated"),
            Self::TaskDeleted => write!(f, "The task has been deleted"),
            Self::TaskDuplicated { title } => write!(f, "\"{title}\" created"),
            Self::TaskMoved { title, column } => {
                write!(f, "\"{title}\" moved to {column}")
            }
            Self::TaskMovedByRule {
                title,
                column,
                rule,
            } => write!(f, "\"{title}\" moved to {column} by rule: {rule}"),
            Self::TaskRemovedRemotely { title } => {
                write!(f, "\"{title}\" was removed elsewhere and is no longer on the board")
            }
            Self::ColumnAdded { title } => write!(f, "\"{title}\" column has been added"),
            Self::ColumnDeleted { title } => write!(f, "\"{title}\" column has been deleted"),
            Self::ColumnNotEmpty { title } => {
                write!(
                    f,
                    "\"{title}\" still holds tasks; move or delete them first"
                )
            }
            Self::RuleCreated { name } => write!(f, "\"{name}\" has been added"),
            Self::RuleDeleted => write!(f, "The automation rule has been deleted"),
            Self::LoggedOut => write!(f, "You have been logged out"),
            Self::OperationFailed { operation } => {
                write!(f, "Failed to {operation}; please try again")
            }
        }
    }
}

/// Sink for user-visible notices.
pub trait BoardNotifier: Send + Sync {
    /// Delivers a notice to the user.
    fn notify(&self, notice: Notice);
}
