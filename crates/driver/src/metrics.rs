// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-tick status and whole-run metrics.
//!
//! [`TickReport`] is what the driver logs after every allocation change;
//! [`RunMetrics`] accumulates them into the summary printed at exit.

use chrono::NaiveDateTime;
use memory_manager::MEGA;
use std::time::Duration;

/// Status after one tick.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TickReport {
    /// Wall-clock time of the tick (not phase-shifted).
    pub timestamp: NaiveDateTime,
    /// Tick counter, starting at 0.
    pub step: u64,
    /// Target after noise and trend, in percent of the maximum.
    pub target_percent: u32,
    pub max_ram_mega: u64,
    /// `(owned chunks + correction) × chunk size`, in bytes.
    pub tracked_bytes: u64,
    /// OS-reported resident memory, in bytes.
    pub measured_bytes: u64,
    pub tick: Duration,
    /// Whether the allocation was discarded after this tick.
    pub drift_reset: bool,
}

impl TickReport {
    pub fn tracked_mb(&self) -> u64 {
        self.tracked_bytes / MEGA
    }

    pub fn measured_mb(&self) -> u64 {
        self.measured_bytes / MEGA
    }

    /// The per-tick status line.
    pub fn status_line(&self) -> String {
        format!(
            "{}, Allocated {}% of {} MB, (in memory array) {} MB, (in process) {} MB for {} sec",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.target_percent,
            self.max_ram_mega,
            self.tracked_mb(),
            self.measured_mb(),
            self.tick.as_secs(),
        )
    }
}

/// Aggregate metrics for a complete run.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct RunMetrics {
    /// Ticks completed.
    pub ticks: u64,
    /// Allocations discarded after drift.
    pub drift_resets: u64,
    /// Highest target seen, in percent.
    pub peak_target_percent: u32,
    /// Highest tracked footprint, in bytes.
    pub peak_tracked_bytes: u64,
    /// Highest OS-reported footprint, in bytes.
    pub peak_measured_bytes: u64,
    /// Whether the run ended on a shutdown request.
    pub cancelled: bool,
}

impl RunMetrics {
    /// Folds one tick into the totals.
    pub fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        if report.drift_reset {
            self.drift_resets += 1;
        }
        self.peak_target_percent = self.peak_target_percent.max(report.target_percent);
        self.peak_tracked_bytes = self.peak_tracked_bytes.max(report.tracked_bytes);
        self.peak_measured_bytes = self.peak_measured_bytes.max(report.measured_bytes);
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} ticks, {} drift resets, peak target {}%, peak tracked {} MB, \
             peak in process {} MB{}",
            self.ticks,
            self.drift_resets,
            self.peak_target_percent,
            self.peak_tracked_bytes / MEGA,
            self.peak_measured_bytes / MEGA,
            if self.cancelled { " (interrupted)" } else { "" },
        )
    }
}
