// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Maximum-memory configuration.
//!
//! A [`MemoryBudget`] is the amount of memory a pattern value of 100
//! corresponds to. Units are decimal, matching the megabyte figures
//! reported by `resource-monitor`.

use crate::MemoryError;
use std::fmt;

const MB: usize = 1_000_000;
const GB: usize = 1_000_000_000;

/// The memory a pattern value of 100% maps to.
///
/// # Examples
/// ```
/// use memory_manager::MemoryBudget;
///
/// let b = MemoryBudget::from_mb(500);
/// assert_eq!(b.as_mb(), 500);
///
/// let b = MemoryBudget::try_from_mb(2000).unwrap();
/// assert_eq!(b.to_string(), "2 GB");
/// assert!(MemoryBudget::try_from_mb(u64::MAX).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MemoryBudget {
    /// Budget in bytes.
    bytes: usize,
}

impl MemoryBudget {
    /// Smallest budget the controller accepts, in megabytes.
    pub const MIN_MB: usize = 100;

    /// Creates a budget from megabytes, saturating at `usize::MAX` bytes.
    ///
    /// Use [`try_from_mb`](Self::try_from_mb) for values read from
    /// configuration.
    pub fn from_mb(mb: usize) -> Self {
        Self {
            bytes: mb.saturating_mul(MB),
        }
    }

    /// Creates a budget from megabytes, failing when the byte count does
    /// not fit in `usize`.
    pub fn try_from_mb(mb: u64) -> Result<Self, MemoryError> {
        usize::try_from(mb)
            .ok()
            .and_then(|mb| mb.checked_mul(MB))
            .map(|bytes| Self { bytes })
            .ok_or(MemoryError::BudgetTooLarge { budget_mb: mb })
    }

    /// Returns the budget in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the budget in megabytes (truncated).
    pub fn as_mb(&self) -> usize {
        self.bytes / MB
    }

    /// Rejects budgets below [`MIN_MB`](Self::MIN_MB).
    pub fn ensure_minimum(self) -> Result<Self, MemoryError> {
        if self.bytes < Self::MIN_MB * MB {
            return Err(MemoryError::BudgetTooSmall {
                budget_mb: self.as_mb(),
                min_mb: Self::MIN_MB,
            });
        }
        Ok(self)
    }
}

impl fmt::Display for MemoryBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= GB && self.bytes % GB == 0 {
            write!(f, "{} GB", self.bytes / GB)
        } else {
            write!(f, "{} MB", self.as_mb())
        }
    }
}
