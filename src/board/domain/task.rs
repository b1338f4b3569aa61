//! Task aggregate and related value objects.

use super::{ColumnId, FieldId, SubtaskId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A single checklist entry within a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    id: SubtaskId,
    title: String,
    completed: bool,
}

impl Subtask {
    /// Creates an incomplete subtask with a fresh identifier.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: SubtaskId::new(),
            title: title.into(),
            completed: false,
        }
    }

    /// Sets the completion flag, consuming the subtask.
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Returns the subtask identifier.
    #[must_use]
    pub const fn id(&self) -> SubtaskId {
        self.id
    }

    /// Returns the subtask title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns whether the subtask has been completed.
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }

    /// Marks the subtask as completed or not.
    pub const fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// Returns an independent copy carrying a fresh identifier.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: SubtaskId::new(),
            title: self.title.clone(),
            completed: self.completed,
        }
    }
}

/// A named free-form value attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    id: FieldId,
    name: String,
    value: String,
}

impl CustomField {
    /// Creates a custom field with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: FieldId::new(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the field identifier.
    #[must_use]
    pub const fn id(&self) -> FieldId {
        self.id
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns an independent copy carrying a fresh identifier.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: FieldId::new(),
            name: self.name.clone(),
            value: self.value.clone(),
        }
    }
}

/// Task aggregate root.
///
/// Tasks reference their containing column by identifier; the column title
/// is a display label and never participates in grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    column_id: ColumnId,
    due_date: Option<DateTime<Utc>>,
    subtasks: Vec<Subtask>,
    custom_fields: Vec<CustomField>,
    created_at: DateTime<Utc>,
}

impl Task {
    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the identifier of the containing column.
    #[must_use]
    pub const fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Returns the due date, if one is set.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the ordered subtask checklist.
    #[must_use]
    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    /// Returns the custom fields.
    #[must_use]
    pub fn custom_fields(&self) -> &[CustomField] {
        &self.custom_fields
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Looks up a custom field by name.
    #[must_use]
    pub fn custom_field(&self, name: &str) -> Option<&CustomField> {
        self.custom_fields.iter().find(|field| field.name() == name)
    }

    /// Re-keys the task to a different column.
    pub const fn move_to_column(&mut self, column_id: ColumnId) {
        self.column_id = column_id;
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(column_id) = patch.column_id {
            self.column_id = column_id;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(subtasks) = &patch.subtasks {
            self.subtasks.clone_from(subtasks);
        }
        if let Some(custom_fields) = &patch.custom_fields {
            self.custom_fields.clone_from(custom_fields);
        }
    }
}

/// Draft for a task that has not yet been assigned a remote identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: String,
    column_id: ColumnId,
    due_date: Option<DateTime<Utc>>,
    subtasks: Vec<Subtask>,
    custom_fields: Vec<CustomField>,
}

impl NewTask {
    /// Creates a draft task destined for the given column.
    #[must_use]
    pub fn new(title: impl Into<String>, column_id: ColumnId) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            column_id,
            due_date: None,
            subtasks: Vec::new(),
            custom_fields: Vec::new(),
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the subtask checklist.
    #[must_use]
    pub fn with_subtasks(mut self, subtasks: impl IntoIterator<Item = Subtask>) -> Self {
        self.subtasks = subtasks.into_iter().collect();
        self
    }

    /// Sets the custom fields.
    #[must_use]
    pub fn with_custom_fields(mut self, fields: impl IntoIterator<Item = CustomField>) -> Self {
        self.custom_fields = fields.into_iter().collect();
        self
    }

    /// Builds an independent copy of an existing task.
    ///
    /// This is a structural clone: the draft carries fresh identities for
    /// every subtask and custom field, the title gains a " (Copy)" suffix,
    /// and the creation timestamp is assigned when the draft materialises.
    #[must_use]
    pub fn duplicate_of(task: &Task, column_id: ColumnId) -> Self {
        Self {
            title: format!("{} (Copy)", task.title()),
            description: task.description().to_owned(),
            column_id,
            due_date: task.due_date(),
            subtasks: task.subtasks().iter().map(Subtask::duplicate).collect(),
            custom_fields: task
                .custom_fields()
                .iter()
                .map(CustomField::duplicate)
                .collect(),
        }
    }

    /// Returns the draft title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the destination column.
    #[must_use]
    pub const fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Materialises the draft into a task with the given identity.
    #[must_use]
    pub fn into_task(self, id: TaskId, clock: &impl Clock) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            column_id: self.column_id,
            due_date: self.due_date,
            subtasks: self.subtasks,
            custom_fields: self.custom_fields,
            created_at: clock.utc(),
        }
    }
}

/// Partial update applied to a remote task record.
///
/// `None` fields are left untouched. The due date carries two levels of
/// optionality so a patch can clear an existing date (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement containing column.
    pub column_id: Option<ColumnId>,
    /// Replacement due date (`Some(None)` clears it).
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Replacement subtask checklist.
    pub subtasks: Option<Vec<Subtask>>,
    /// Replacement custom fields.
    pub custom_fields: Option<Vec<CustomField>>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Patches the containing column.
    #[must_use]
    pub const fn with_column(mut self, column_id: ColumnId) -> Self {
        self.column_id = Some(column_id);
        self
    }

    /// Patches the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Patches the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Patches the due date (`None` clears it).
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Patches the subtask checklist.
    #[must_use]
    pub fn with_subtasks(mut self, subtasks: impl IntoIterator<Item = Subtask>) -> Self {
        self.subtasks = Some(subtasks.into_iter().collect());
        self
    }

    /// Patches the custom fields.
    #[must_use]
    pub fn with_custom_fields(mut self, fields: impl IntoIterator<Item = CustomField>) -> Self {
        self.custom_fields = Some(fields.into_iter().collect());
        self
    }
}
