// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunables for [`Alerts`](crate::Alerts).

/// Priority given to alerts raised without an explicit one.
pub const DEFAULT_PRIORITY: u8 = 127;

/// Default bound on upward hierarchy walks.
pub const DEFAULT_MAX_HIERARCHY_DEPTH: usize = 4096;

/// Configuration for an [`Alerts`](crate::Alerts) instance.
///
/// # Example
///
/// ```
/// use understory_alert::{AlertConfig, Alerts};
///
/// let config = AlertConfig::default()
///     .with_default_priority(10)
///     .with_max_hierarchy_depth(64);
/// let alerts = Alerts::new(config);
/// assert_eq!(alerts.config().default_priority, 10);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AlertConfig {
    /// Priority used when an [`Alert`](crate::Alert) carries none.
    pub default_priority: u8,
    /// Maximum number of ancestors visited by one upward walk.
    ///
    /// Walks also stop when they revisit an entity, so this only matters for
    /// very deep (or very long corrupted) parent chains.
    pub max_hierarchy_depth: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            max_hierarchy_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
        }
    }
}

impl AlertConfig {
    /// Sets [`default_priority`](Self::default_priority).
    #[must_use]
    pub fn with_default_priority(mut self, priority: u8) -> Self {
        self.default_priority = priority;
        self
    }

    /// Sets [`max_hierarchy_depth`](Self::max_hierarchy_depth).
    #[must_use]
    pub fn with_max_hierarchy_depth(mut self, depth: usize) -> Self {
        self.max_hierarchy_depth = depth;
        self
    }
}
