//! Tunable timings for the reconciliation services.

use chrono::Duration as ChronoDuration;
use std::time::Duration;

/// Timing knobs threaded through the reconciliation services.
///
/// There is deliberately no file or environment loading here; embedders
/// construct the value directly and the defaults match the product
/// behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    drag_timeout: ChronoDuration,
    orphan_interval: Duration,
    rule_cooldown: ChronoDuration,
}

impl BoardConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            drag_timeout: ChronoDuration::seconds(10),
            orphan_interval: Duration::from_secs(30),
            rule_cooldown: ChronoDuration::seconds(5),
        }
    }

    /// Sets how long a drag gesture may suppress snapshots before the
    /// stuck-flag recovery treats it as abandoned.
    #[must_use]
    pub const fn with_drag_timeout(mut self, timeout: ChronoDuration) -> Self {
        self.drag_timeout = timeout;
        self
    }

    /// Sets the period of the orphan reconciliation sweep.
    #[must_use]
    pub const fn with_orphan_interval(mut self, interval: Duration) -> Self {
        self.orphan_interval = interval;
        self
    }

    /// Sets the window during which a fired (task, target) move-intent is
    /// not re-applied.
    #[must_use]
    pub const fn with_rule_cooldown(mut self, cooldown: ChronoDuration) -> Self {
        self.rule_cooldown = cooldown;
        self
    }

    /// Returns the drag stuck-flag timeout.
    #[must_use]
    pub const fn drag_timeout(&self) -> ChronoDuration {
        self.drag_timeout
    }

    /// Returns the orphan sweep period.
    #[must_use]
    pub const fn orphan_interval(&self) -> Duration {
        self.orphan_interval
    }

    /// Returns the move-intent cool-down window.
    #[must_use]
    pub const fn rule_cooldown(&self) -> ChronoDuration {
        self.rule_cooldown
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new()
    }
}
