//! Recording notifier for tests.

use std::sync::{Arc, PoisonError, RwLock};

use crate::board::ports::{BoardNotifier, Notice};

/// Notifier that records every notice it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<RwLock<Vec<Notice>>>,
}

impl RecordingNotifier {
    /// Creates an empty recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded notices, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Discards all recorded notices.
    pub fn clear(&self) {
        self.notices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl BoardNotifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
