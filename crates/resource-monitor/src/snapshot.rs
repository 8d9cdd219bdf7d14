// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Aggregated point-in-time memory snapshot.
//!
//! A [`MemorySnapshot`] combines the process footprint with system-wide
//! memory state. The `run` command prints one at the start and end of a
//! run, and the `status` command prints one.

use crate::{MemoryInfo, MonitorError, ProcessMemory};
use std::time::{SystemTime, UNIX_EPOCH};

/// Available system memory below which the host is considered constrained.
const CONSTRAINED_AVAILABLE_MB: u64 = 256;

/// Process and system memory read at the same moment.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MemorySnapshot {
    /// Footprint of the current process.
    pub process: ProcessMemory,
    /// System memory state.
    pub system: MemoryInfo,
    /// Unix timestamp in milliseconds when the snapshot was taken.
    pub timestamp_ms: u64,
}

impl MemorySnapshot {
    /// Captures a new snapshot. Both readings must succeed.
    pub fn capture() -> Result<Self, MonitorError> {
        let process = ProcessMemory::read()?;
        let system = MemoryInfo::read()?;

        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Ok(Self {
            process,
            system,
            timestamp_ms,
        })
    }

    /// Returns a summary string suitable for logging or CLI display.
    ///
    /// # Example output
    /// ```text
    /// process = 412MB, total = 3977MB, avail = 2515MB, used = 1462MB, free = 223MB, percent = 36.8
    /// ```
    pub fn summary(&self) -> String {
        format!(
            "process = {}MB, total = {}MB, avail = {}MB, used = {}MB, free = {}MB, percent = {:.1}",
            self.process.resident_mb(),
            self.system.total_mb(),
            self.system.available_mb(),
            self.system.used_mb(),
            self.system.free_mb(),
            self.system.utilisation() * 100.0,
        )
    }

    /// Returns `true` if the host has less than 256 MB available.
    ///
    /// Growing further from here risks the kernel OOM killer picking a
    /// process other than the load generator.
    pub fn is_memory_constrained(&self) -> bool {
        self.system.available_mb() < CONSTRAINED_AVAILABLE_MB
    }
}
