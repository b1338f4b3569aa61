//! Automation rules: conditions, actions, and derived move-intents.

use super::{ColumnId, RuleId, Task, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Column title treated as terminal for the overdue condition.
///
/// An overdue task already sitting in a column with this title is never
/// flagged again, matching the board's stock "Completed" column.
const COMPLETED_COLUMN_TITLE: &str = "Completed";

/// Comparison operator for custom-field conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOperator {
    /// Field value equals the target value.
    Equals,
    /// Field value differs from the target value.
    NotEquals,
    /// Field value contains the target value as a substring.
    Contains,
}

/// Condition half of an automation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Task due date lies strictly in the past.
    DueDateOverdue,
    /// Task has at least one subtask and every subtask is completed.
    SubtasksAllCompleted,
    /// A named custom field compares against a target value.
    CustomField {
        /// Name of the custom field to inspect.
        field: String,
        /// Comparison operator.
        operator: FieldOperator,
        /// Target value to compare against.
        value: String,
    },
}

impl RuleCondition {
    /// Evaluates the condition against a task.
    ///
    /// `column_title` is the display title of the task's current column and
    /// `now` the evaluation instant. Evaluation is pure: no clock reads, no
    /// side effects.
    #[must_use]
    pub fn is_met(&self, task: &Task, column_title: &str, now: DateTime<Utc>) -> bool {
        match self {
            Self::DueDateOverdue => task
                .due_date()
                .is_some_and(|due| due < now && column_title != COMPLETED_COLUMN_TITLE),
            Self::SubtasksAllCompleted => {
                !task.subtasks().is_empty()
                    && task.subtasks().iter().all(|subtask| subtask.completed())
            }
            Self::CustomField {
                field,
                operator,
                value,
            } => task
                .custom_field(field)
                .is_some_and(|found| operator.compare(found.value(), value)),
        }
    }
}

impl FieldOperator {
    fn compare(self, actual: &str, target: &str) -> bool {
        match self {
            Self::Equals => actual == target,
            Self::NotEquals => actual != target,
            Self::Contains => actual.contains(target),
        }
    }
}

/// Action half of an automation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    /// Move the matching task into the target column.
    MoveToColumn {
        /// Destination column identifier.
        target: ColumnId,
    },
}

impl RuleAction {
    /// Returns the destination column when the action moves tasks.
    #[must_use]
    pub const fn target_column(&self) -> ColumnId {
        match self {
            Self::MoveToColumn { target } => *target,
        }
    }
}

/// Automation rule aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    id: RuleId,
    name: String,
    condition: RuleCondition,
    action: RuleAction,
    enabled: bool,
    created_at: DateTime<Utc>,
}

impl Rule {
    /// Returns the rule identifier.
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the condition.
    #[must_use]
    pub const fn condition(&self) -> &RuleCondition {
        &self.condition
    }

    /// Returns the action.
    #[must_use]
    pub const fn action(&self) -> &RuleAction {
        &self.action
    }

    /// Returns whether the rule participates in evaluation.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: &RulePatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(condition) = &patch.condition {
            self.condition.clone_from(condition);
        }
        if let Some(action) = patch.action {
            self.action = action;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
    }
}

/// Draft for a rule that has not yet been assigned a remote identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRule {
    name: String,
    condition: RuleCondition,
    action: RuleAction,
    enabled: bool,
}

impl NewRule {
    /// Creates an enabled rule draft.
    #[must_use]
    pub fn new(name: impl Into<String>, condition: RuleCondition, action: RuleAction) -> Self {
        Self {
            name: name.into(),
            condition,
            action,
            enabled: true,
        }
    }

    /// Sets the enablement flag.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the draft name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Materialises the draft into a rule with the given identity.
    #[must_use]
    pub fn into_rule(self, id: RuleId, clock: &impl Clock) -> Rule {
        Rule {
            id,
            name: self.name,
            condition: self.condition,
            action: self.action,
            enabled: self.enabled,
            created_at: clock.utc(),
        }
    }
}

/// Partial update applied to a remote rule record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulePatch {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement condition.
    pub condition: Option<RuleCondition>,
    /// Replacement action.
    pub action: Option<RuleAction>,
    /// Replacement enablement flag.
    pub enabled: Option<bool>,
}

impl RulePatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Patches the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Patches the condition.
    #[must_use]
    pub fn with_condition(mut self, condition: RuleCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Patches the action.
    #[must_use]
    pub const fn with_action(mut self, action: RuleAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Patches the enablement flag.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }
}

/// A derived instruction to move a task into a target column.
///
/// Intents are produced by rule evaluation and applied as remote updates;
/// they are never applied to local state directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveIntent {
    /// Task to move.
    pub task_id: TaskId,
    /// Destination column.
    pub target: ColumnId,
}
