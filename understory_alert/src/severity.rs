// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Severity levels and the rank used to order alert chains.

use core::fmt;

/// How serious an alert is.
///
/// Severities are ordered: `Warning < Error`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Something looks wrong but may still work.
    #[default]
    Warning = 0,
    /// Something is broken.
    Error = 1,
}

impl Severity {
    /// Number of severity levels.
    pub const COUNT: usize = 2;

    /// All severities, least serious first.
    pub const ALL: [Self; Self::COUNT] = [Self::Warning, Self::Error];

    /// Returns the index of this severity into per-severity arrays.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Ordering key of an alert within a chain.
///
/// Compares by severity first, then by priority. A higher rank sits closer to
/// the head of the chain. Ties are resolved by recency outside of this type:
/// the most recently raised alert goes first.
///
/// ```
/// use understory_alert::{Rank, Severity};
///
/// let loud_warning = Rank::new(Severity::Warning, 255);
/// let quiet_error = Rank::new(Severity::Error, 0);
/// assert!(quiet_error > loud_warning);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank {
    /// Primary key.
    pub severity: Severity,
    /// Secondary key; higher is more important.
    pub priority: u8,
}

impl Rank {
    /// Creates a rank.
    #[must_use]
    pub const fn new(severity: Severity, priority: u8) -> Self {
        Self { severity, priority }
    }
}
