// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-process memory via `/proc/self/status`.
//!
//! `VmRSS` is the figure the allocation controller steers: the pages of
//! this process currently resident in RAM. `VmHWM` (peak RSS) and
//! `VmSize` (virtual size) are reported for diagnostics.

use crate::procfs::{find_kb_field, read_proc_file, require_kb_field};
use crate::{MonitorError, MEGA};
use std::path::Path;

/// Status file of the calling process.
const SELF_STATUS_PATH: &str = "/proc/self/status";

/// Memory footprint of a single process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ProcessMemory {
    /// Resident set size in bytes.
    pub resident_bytes: u64,
    /// Peak resident set size in bytes (0 if the kernel does not report it).
    pub peak_resident_bytes: u64,
    /// Virtual memory size in bytes (0 if the kernel does not report it).
    pub virtual_bytes: u64,
}

impl ProcessMemory {
    /// Reads the footprint of the current process.
    pub fn read() -> Result<Self, MonitorError> {
        Self::read_from(Path::new(SELF_STATUS_PATH))
    }

    /// Reads a `/proc/<pid>/status`-formatted file.
    pub fn read_from(path: &Path) -> Result<Self, MonitorError> {
        let content = read_proc_file(path)?;
        Self::parse(&content, path)
    }

    pub(crate) fn parse(content: &str, source_path: &Path) -> Result<Self, MonitorError> {
        Ok(Self {
            resident_bytes: require_kb_field(content, "VmRSS:", source_path)?,
            peak_resident_bytes: find_kb_field(content, "VmHWM:", source_path)?.unwrap_or(0),
            virtual_bytes: find_kb_field(content, "VmSize:", source_path)?.unwrap_or(0),
        })
    }

    /// Resident set size in megabytes.
    pub fn resident_mb(&self) -> u64 {
        self.resident_bytes / MEGA
    }
}
