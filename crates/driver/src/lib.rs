// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # driver
//!
//! The loop that turns a load pattern into memory pressure.
//!
//! The driver takes:
//! - A [`ConsumerConfig`] (TOML, CLI flags, `MAX_RAM_MEGA`).
//! - A `PatternTable` from `load-pattern`.
//! - An `AllocationController` from `memory-manager`.
//!
//! And every tick looks up the target for the current time, moves the
//! allocation there, and reports tracked versus measured memory.
//!
//! # Type-State Pipeline
//! ```text
//! Driver<Idle> → Driver<Running> → RunMetrics
//! ```
//!
//! # Cancellation
//! A [`Shutdown`] listener is polled while the loop sleeps between ticks.
//! Interrupting a run is not an error.

mod clock;
mod config;
mod driver;
mod error;
mod metrics;
pub mod shutdown;

pub use clock::{Clock, SystemClock};
pub use config::{ConsumerConfig, MAX_RAM_ENV};
pub use driver::{Driver, DriverState, Idle, Running};
pub use error::DriverError;
pub use metrics::{RunMetrics, TickReport};
pub use shutdown::{Shutdown, ShutdownTrigger};
