// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-manager
//!
//! Holds a configurable amount of memory in fixed-size chunks and moves the
//! process footprint toward a target percentage of a maximum.
//!
//! # Key Components
//!
//! - [`MemoryBudget`] — the maximum memory in decimal megabytes, with a
//!   checked constructor and a 100 MB floor.
//! - [`AllocationController`] — splits the maximum into 100 chunks, corrects
//!   for the process baseline, grows and shrinks toward a target, and resets
//!   when measured and tracked memory drift apart.
//! - [`ChunkArena`] — the committed memory itself.
//! - [`MemoryProbe`] — how the controller measures the process; the default
//!   [`ProcfsProbe`] reads `VmRSS` from `/proc/self/status`.
//! - [`Trend`] — an optional linear multiplier over the pattern cycle.
//! - [`AllocationStats`] — cumulative controller metrics.
//!
//! # Example
//! ```no_run
//! use memory_manager::{AllocationController, MemoryBudget};
//!
//! # async fn demo() -> Result<(), memory_manager::MemoryError> {
//! let mut controller = AllocationController::new(MemoryBudget::from_mb(500))?;
//! controller.change_allocation(40).await;
//! let drift = controller.check_drift()?;
//! println!("tracked {} bytes, reset: {}", drift.tracked_bytes, drift.reset);
//! # Ok(())
//! # }
//! ```

mod arena;
mod budget;
mod controller;
mod error;
mod probe;
mod stats;
mod trend;

pub use arena::ChunkArena;
pub use budget::MemoryBudget;
pub use controller::{
    AllocationController, DriftCheck, CHUNK_COUNT, DRIFT_THRESHOLD_CHUNKS, SETTLE_TIME,
};
pub use error::MemoryError;
pub use probe::{MemoryProbe, ProcfsProbe};
pub use resource_monitor::MEGA;
pub use stats::AllocationStats;
pub use trend::Trend;
