//! Column metadata and related value objects.

use super::{BoardDomainError, ColumnId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Column metadata as held by the remote store.
///
/// The tasks grouped under a column are a derived projection and are never
/// part of the column record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    id: ColumnId,
    title: String,
    color: Option<String>,
    created_at: DateTime<Utc>,
}

impl Column {
    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the color tag, if one is set.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: &ColumnPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(color) = &patch.color {
            self.color.clone_from(color);
        }
    }
}

/// Draft for a column that has not yet been assigned a remote identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewColumn {
    title: String,
    color: Option<String>,
}

impl NewColumn {
    /// Creates a validated column draft.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyColumnTitle`] when the title is
    /// blank after trimming.
    pub fn new(title: impl Into<String>) -> Result<Self, BoardDomainError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(BoardDomainError::EmptyColumnTitle);
        }
        Ok(Self { title, color: None })
    }

    /// Sets the color tag.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Returns the draft title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Materialises the draft into a column with the given identity.
    #[must_use]
    pub fn into_column(self, id: ColumnId, clock: &impl Clock) -> Column {
        Column {
            id,
            title: self.title,
            color: self.color,
            created_at: clock.utc(),
        }
    }
}

/// Partial update applied to a remote column record.
///
/// The color carries two levels of optionality so a patch can clear an
/// existing tag (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPatch {
    /// Replacement display title.
    pub title: Option<String>,
    /// Replacement color tag (`Some(None)` clears it).
    pub color: Option<Option<String>>,
}

impl ColumnPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Patches the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Patches the color tag (`None` clears it).
    #[must_use]
    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = Some(color);
        self
    }
}
