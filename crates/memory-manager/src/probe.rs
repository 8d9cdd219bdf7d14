// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Source of the process's OS-level memory figure.

use crate::MemoryError;
use resource_monitor::ProcessMemory;

/// Measures how much memory the OS charges to this process.
///
/// The controller reads it once at construction (to learn the baseline)
/// and the driver reads it every tick (to detect drift).
pub trait MemoryProbe: Send {
    /// Current resident memory in bytes.
    fn resident_bytes(&self) -> Result<u64, MemoryError>;
}

/// Reads `VmRSS` from `/proc/self/status`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcfsProbe;

impl MemoryProbe for ProcfsProbe {
    fn resident_bytes(&self) -> Result<u64, MemoryError> {
        Ok(ProcessMemory::read()?.resident_bytes)
    }
}
