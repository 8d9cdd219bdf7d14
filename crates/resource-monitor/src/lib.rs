// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # resource-monitor
//!
//! Reads memory statistics from `/proc/` so the load generator can compare
//! what it believes it holds against what the kernel actually charges it.
//!
//! # Monitored Metrics
//! - **Process resident memory** — `VmRSS` from `/proc/self/status`.
//! - **System memory** — total, available, and free from `/proc/meminfo`.
//!
//! All reads are non-blocking and suitable for per-tick polling.
//! Megabytes are decimal: 1 MB = 10^6 bytes.
//!
//! # Example
//! ```no_run
//! use resource_monitor::MemorySnapshot;
//!
//! let snap = MemorySnapshot::capture().expect("failed to read /proc");
//! println!("{}", snap.summary());
//! ```

mod error;
mod memory;
mod process;
mod procfs;
mod snapshot;

pub use error::MonitorError;
pub use memory::MemoryInfo;
pub use process::ProcessMemory;
pub use snapshot::MemorySnapshot;

/// Bytes per (decimal) megabyte.
pub const MEGA: u64 = 1_000_000;

/// Captures a point-in-time snapshot of process and system memory.
///
/// This is a convenience wrapper around [`MemorySnapshot::capture()`].
pub fn snapshot() -> Result<MemorySnapshot, MonitorError> {
    MemorySnapshot::capture()
}
