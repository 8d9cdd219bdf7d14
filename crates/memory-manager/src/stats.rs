// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation statistics for diagnostics.
//!
//! [`AllocationStats`] tracks cumulative metrics about how the controller
//! has moved the process footprint: grow/shrink events, chunk churn, peak
//! tracked memory, and drift resets.

use crate::MEGA;

/// Cumulative statistics about controller activity.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AllocationStats {
    /// Total number of allocation changes requested.
    pub total_changes: u64,
    /// Changes that added chunks.
    pub grow_events: u64,
    /// Changes that removed chunks.
    pub shrink_events: u64,
    /// Chunks added over the controller's lifetime.
    pub chunks_allocated: u64,
    /// Chunks released over the controller's lifetime (including resets).
    pub chunks_released: u64,
    /// Number of times the whole allocation was discarded after drift.
    pub drift_resets: u64,
    /// Peak tracked memory (owned chunks plus baseline) in bytes.
    pub peak_tracked_bytes: u64,
}

impl AllocationStats {
    /// Records a change of `delta` chunks.
    pub(crate) fn record_change(&mut self, delta: isize) {
        self.total_changes += 1;
        if delta > 0 {
            self.grow_events += 1;
            self.chunks_allocated += delta.unsigned_abs() as u64;
        } else if delta < 0 {
            self.shrink_events += 1;
            self.chunks_released += delta.unsigned_abs() as u64;
        }
    }

    /// Records a drift reset that dropped `chunks` chunks.
    pub(crate) fn record_reset(&mut self, chunks: usize) {
        self.drift_resets += 1;
        self.chunks_released += chunks as u64;
    }

    /// Updates the peak tracked-memory high-water mark if needed.
    pub(crate) fn update_peak(&mut self, tracked_bytes: u64) {
        if tracked_bytes > self.peak_tracked_bytes {
            self.peak_tracked_bytes = tracked_bytes;
        }
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Changes: {} total ({} grow, {} shrink), {} chunks allocated, \
             {} released, {} drift resets, peak {} MB",
            self.total_changes,
            self.grow_events,
            self.shrink_events,
            self.chunks_allocated,
            self.chunks_released,
            self.drift_resets,
            self.peak_tracked_bytes / MEGA,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let s = AllocationStats::default();
        assert_eq!(s.total_changes, 0);
        assert_eq!(s.peak_tracked_bytes, 0);
    }

    #[test]
    fn test_record_change() {
        let mut s = AllocationStats::default();
        s.record_change(5);
        s.record_change(-2);
        s.record_change(0);
        assert_eq!(s.total_changes, 3);
        assert_eq!(s.grow_events, 1);
        assert_eq!(s.shrink_events, 1);
        assert_eq!(s.chunks_allocated, 5);
        assert_eq!(s.chunks_released, 2);
    }

    #[test]
    fn test_reset_counts_released_chunks() {
        let mut s = AllocationStats::default();
        s.record_change(7);
        s.record_reset(7);
        assert_eq!(s.drift_resets, 1);
        assert_eq!(s.chunks_released, 7);
    }

    #[test]
    fn test_peak_tracking() {
        let mut s = AllocationStats::default();
        s.update_peak(100);
        s.update_peak(50);
        assert_eq!(s.peak_tracked_bytes, 100);
        s.update_peak(200);
        assert_eq!(s.peak_tracked_bytes, 200);
    }

    #[test]
    fn test_summary() {
        let mut s = AllocationStats::default();
        s.record_change(3);
        s.record_change(-1);
        s.update_peak(250_000_000);
        let summary = s.summary();
        assert!(summary.contains("2 total"));
        assert!(summary.contains("1 grow"));
        assert!(summary.contains("peak 250 MB"));
    }
}
