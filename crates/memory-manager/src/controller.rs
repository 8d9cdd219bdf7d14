// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Drives the process footprint toward a target percentage.
//!
//! The maximum memory is split into [`CHUNK_COUNT`] chunks, so a target of
//! `p` percent is simply `p` chunks. At construction the controller measures
//! what the process already holds (runtime, allocator, binary) and records
//! it as a baseline `correction` in whole chunks plus a byte remainder. Only
//! the part of a target above that baseline is allocated:
//!
//! ```text
//!   target 40%          ┌──────────── 40 chunks ────────────┐
//!   baseline 3 chunks   [c c c|r][ owned: 37 chunks, first one short by r ]
//! ```
//!
//! # Drift
//! Freed memory is not always returned to the OS promptly. After each
//! change the driver compares the measured footprint with the tracked one;
//! if they differ by more than [`DRIFT_THRESHOLD_CHUNKS`] chunks the whole
//! allocation is dropped and rebuilt from empty on the next tick.

use crate::{
    AllocationStats, ChunkArena, MemoryBudget, MemoryError, MemoryProbe, ProcfsProbe, Trend, MEGA,
};
use std::time::Duration;

/// Number of chunks the maximum memory is divided into (one per percent).
pub const CHUNK_COUNT: usize = 100;

/// Pause after each allocation change so the OS figures catch up.
pub const SETTLE_TIME: Duration = Duration::from_millis(300);

/// Tracked/measured mismatch, in chunks, that triggers a reset.
pub const DRIFT_THRESHOLD_CHUNKS: usize = 3;

/// Measured versus tracked footprint after an allocation change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DriftCheck {
    /// Resident memory reported by the OS, in bytes.
    pub measured_bytes: u64,
    /// `(owned chunks + correction) × chunk size`, in bytes.
    pub tracked_bytes: u64,
    /// Whether the allocation was discarded.
    pub reset: bool,
}

impl DriftCheck {
    /// Absolute difference between measured and tracked bytes.
    pub fn difference_bytes(&self) -> u64 {
        self.measured_bytes.abs_diff(self.tracked_bytes)
    }
}

/// Owns the allocated memory and moves it toward target percentages.
#[derive(Debug)]
pub struct AllocationController<P: MemoryProbe = ProcfsProbe> {
    budget: MemoryBudget,
    arena: ChunkArena,
    /// Whole chunks already resident when the controller was created.
    correction: usize,
    /// Baseline bytes beyond `correction` whole chunks.
    correction_rest: usize,
    probe: P,
    settle: Duration,
    trend: Trend,
    step: u64,
    stats: AllocationStats,
}

impl AllocationController<ProcfsProbe> {
    /// Creates a controller that measures this process through procfs.
    pub fn new(budget: MemoryBudget) -> Result<Self, MemoryError> {
        Self::with_probe(budget, ProcfsProbe)
    }
}

impl<P: MemoryProbe> AllocationController<P> {
    /// Creates a controller with a custom memory probe.
    ///
    /// Rejects budgets below [`MemoryBudget::MIN_MB`] and measures the
    /// baseline immediately.
    pub fn with_probe(budget: MemoryBudget, probe: P) -> Result<Self, MemoryError> {
        let budget = budget.ensure_minimum()?;
        let chunk_size = budget.as_bytes() / CHUNK_COUNT;

        let measured = usize::try_from(probe.resident_bytes()?).unwrap_or(usize::MAX);
        let correction = measured / chunk_size;
        let correction_rest = measured % chunk_size;

        tracing::info!(
            "allocation controller: max {budget}, chunk {} MB, baseline {} chunks + {} bytes",
            chunk_size as u64 / MEGA,
            correction,
            correction_rest,
        );

        Ok(Self {
            budget,
            arena: ChunkArena::new(chunk_size, correction_rest),
            correction,
            correction_rest,
            probe,
            settle: SETTLE_TIME,
            trend: Trend::flat(),
            step: 0,
            stats: AllocationStats::default(),
        })
    }

    /// Overrides the settle pause after each change.
    pub fn with_settle_time(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Installs a linear trend applied by [`apply_trend`](Self::apply_trend).
    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = trend;
        self
    }

    pub fn budget(&self) -> MemoryBudget {
        self.budget
    }

    pub fn chunk_size(&self) -> usize {
        self.arena.chunk_size()
    }

    /// Chunks currently owned (excluding the baseline).
    pub fn owned_chunks(&self) -> usize {
        self.arena.chunks()
    }

    /// Baseline in whole chunks.
    pub fn correction(&self) -> usize {
        self.correction
    }

    /// Baseline remainder in bytes.
    pub fn correction_rest(&self) -> usize {
        self.correction_rest
    }

    pub fn settle_time(&self) -> Duration {
        self.settle
    }

    pub fn trend(&self) -> Trend {
        self.trend
    }

    /// Number of completed ticks.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Advances the tick counter that feeds the trend.
    pub fn advance_step(&mut self) {
        self.step += 1;
    }

    /// Trend multiplier for the current step.
    pub fn trend_multiplier(&self) -> f64 {
        self.trend.multiplier(self.step)
    }

    /// Scales a pattern percentage by the trend at the current step.
    pub fn apply_trend(&self, percent: u32) -> u32 {
        self.trend.apply(percent, self.step)
    }

    /// Tracked footprint: `(owned + correction) × chunk_size` bytes.
    pub fn tracked_bytes(&self) -> u64 {
        ((self.arena.chunks() + self.correction) * self.arena.chunk_size()) as u64
    }

    /// Bytes held by the arena itself.
    pub fn owned_bytes(&self) -> usize {
        self.arena.len_bytes()
    }

    /// OS-measured footprint in bytes.
    pub fn measured_bytes(&self) -> Result<u64, MemoryError> {
        self.probe.resident_bytes()
    }

    pub fn stats(&self) -> &AllocationStats {
        &self.stats
    }

    /// Moves the owned allocation to `target_percent` of the maximum,
    /// net of the baseline, then waits for the settle time.
    ///
    /// Targets at or below the baseline release everything. Calling twice
    /// with the same target leaves the chunk count unchanged.
    pub async fn change_allocation(&mut self, target_percent: u32) -> usize {
        let effective = (target_percent as usize).saturating_sub(self.correction);
        let delta = self.arena.resize_to(effective);

        if delta != 0 {
            tracing::debug!(
                "allocation {target_percent}%: {delta:+} chunks, now {} owned ({} bytes)",
                self.arena.chunks(),
                self.arena.len_bytes(),
            );
        }
        self.stats.record_change(delta);
        self.stats.update_peak(self.tracked_bytes());

        tokio::time::sleep(self.settle).await;
        self.arena.chunks()
    }

    /// Compares measured and tracked memory and discards the allocation if
    /// they differ by more than [`DRIFT_THRESHOLD_CHUNKS`] chunks.
    ///
    /// A reset is recovery, not failure: the next change rebuilds from empty.
    pub fn check_drift(&mut self) -> Result<DriftCheck, MemoryError> {
        let measured_bytes = self.measured_bytes()?;
        let tracked_bytes = self.tracked_bytes();
        let threshold = (DRIFT_THRESHOLD_CHUNKS * self.arena.chunk_size()) as u64;

        let reset = measured_bytes.abs_diff(tracked_bytes) > threshold;
        if reset {
            tracing::warn!(
                "memory drift: process {} MB vs tracked {} MB, releasing {} chunks",
                measured_bytes / MEGA,
                tracked_bytes / MEGA,
                self.arena.chunks(),
            );
            self.reset();
        }

        Ok(DriftCheck {
            measured_bytes,
            tracked_bytes,
            reset,
        })
    }

    /// Drops every owned chunk.
    pub fn reset(&mut self) {
        self.stats.record_reset(self.arena.chunks());
        self.arena.clear();
    }

    /// Multi-line description of the controller's sizing.
    pub fn describe(&self) -> String {
        let chunk = self.arena.chunk_size() as u64;
        format!(
            "maximum memory: {}, chunk size: {} MB, initial allocation: {} MB, correction rest: {} MB",
            self.budget,
            chunk / MEGA,
            self.correction as u64 * chunk / MEGA,
            self.correction_rest as u64 / MEGA,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    /// Probe whose reading tests set directly.
    #[derive(Debug, Clone, Default)]
    struct FixedProbe(Arc<AtomicU64>);

    impl FixedProbe {
        fn new(bytes: u64) -> Self {
            Self(Arc::new(AtomicU64::new(bytes)))
        }

        fn set(&self, bytes: u64) {
            self.0.store(bytes, Ordering::SeqCst);
        }
    }

    impl MemoryProbe for FixedProbe {
        fn resident_bytes(&self) -> Result<u64, MemoryError> {
            Ok(self.0.load(Ordering::SeqCst))
        }
    }

    const MB: u64 = 1_000_000;

    /// 100 MB budget, so one chunk is 1 MB.
    fn controller(probe: &FixedProbe) -> AllocationController<FixedProbe> {
        AllocationController::with_probe(MemoryBudget::from_mb(100), probe.clone())
            .unwrap()
            .with_settle_time(Duration::ZERO)
    }

    #[test]
    fn test_baseline_correction() {
        let probe = FixedProbe::new(3_450_000);
        let c = controller(&probe);
        assert_eq!(c.chunk_size(), 1_000_000);
        assert_eq!(c.correction(), 3);
        assert_eq!(c.correction_rest(), 450_000);
        assert_eq!(c.owned_chunks(), 0);
        assert_eq!(c.tracked_bytes(), 3 * MB);
    }

    #[test]
    fn test_budget_below_minimum_rejected() {
        let probe = FixedProbe::new(MB);
        let result = AllocationController::with_probe(MemoryBudget::from_mb(99), probe);
        assert!(matches!(result, Err(MemoryError::BudgetTooSmall { .. })));
    }

    #[tokio::test]
    async fn test_grow_subtracts_baseline() {
        let probe = FixedProbe::new(3_450_000);
        let mut c = controller(&probe);

        assert_eq!(c.change_allocation(40).await, 37);
        assert_eq!(c.tracked_bytes(), 40 * MB);
        // First chunk is short by the baseline remainder.
        assert_eq!(c.owned_bytes(), 37 * 1_000_000 - 450_000);
        assert_eq!(c.stats().peak_tracked_bytes, 40 * MB);
    }

    #[tokio::test]
    async fn test_shrink_and_floor() {
        let probe = FixedProbe::new(2 * MB);
        let mut c = controller(&probe);

        c.change_allocation(60).await;
        assert_eq!(c.owned_chunks(), 58);
        c.change_allocation(10).await;
        assert_eq!(c.owned_chunks(), 8);
        // Below the baseline everything is released.
        c.change_allocation(1).await;
        assert_eq!(c.owned_chunks(), 0);
        assert_eq!(c.owned_bytes(), 0);
        assert_eq!(c.stats().shrink_events, 2);
    }

    #[tokio::test]
    async fn test_change_is_idempotent() {
        let probe = FixedProbe::new(MB / 2);
        let mut c = controller(&probe);

        let first = c.change_allocation(25).await;
        let second = c.change_allocation(25).await;
        assert_eq!(first, 25);
        assert_eq!(first, second);
        assert_eq!(c.stats().grow_events, 1);
        assert_eq!(c.stats().total_changes, 2);
    }

    #[tokio::test]
    async fn test_over_one_hundred_percent() {
        let probe = FixedProbe::new(0);
        let mut c = controller(&probe);
        assert_eq!(c.change_allocation(120).await, 120);
        assert_eq!(c.tracked_bytes(), 120 * MB);
    }

    #[tokio::test]
    async fn test_drift_within_threshold_keeps_allocation() {
        let probe = FixedProbe::new(MB);
        let mut c = controller(&probe);
        c.change_allocation(30).await;

        probe.set(32_900_000);
        let check = c.check_drift().unwrap();
        assert!(!check.reset);
        assert_eq!(check.tracked_bytes, 30 * MB);
        assert_eq!(check.difference_bytes(), 2_900_000);
        assert_eq!(c.owned_chunks(), 29);
    }

    #[tokio::test]
    async fn test_drift_beyond_threshold_resets() {
        let probe = FixedProbe::new(MB);
        let mut c = controller(&probe);
        c.change_allocation(30).await;

        // Allocator kept 3.1 MB more than requested: over 3 chunks.
        probe.set(33_100_000);
        let check = c.check_drift().unwrap();
        assert!(check.reset);
        assert_eq!(c.owned_chunks(), 0);
        assert_eq!(c.stats().drift_resets, 1);

        // The next change rebuilds from empty.
        probe.set(MB);
        assert_eq!(c.change_allocation(30).await, 29);
    }

    #[tokio::test]
    async fn test_drift_below_tracked_resets() {
        let probe = FixedProbe::new(MB);
        let mut c = controller(&probe);
        c.change_allocation(50).await;

        probe.set(20 * MB);
        assert!(c.check_drift().unwrap().reset);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_time_elapses() {
        let probe = FixedProbe::new(0);
        let mut c = AllocationController::with_probe(MemoryBudget::from_mb(100), probe).unwrap();
        assert_eq!(c.settle_time(), SETTLE_TIME);

        let start = tokio::time::Instant::now();
        c.change_allocation(10).await;
        assert!(start.elapsed() >= SETTLE_TIME);
    }

    #[test]
    fn test_trend_and_step() {
        let probe = FixedProbe::new(0);
        let mut c = controller(&probe).with_trend(Trend::new(0.1, 3600, 5));
        assert_eq!(c.apply_trend(50), 50);
        for _ in 0..720 {
            c.advance_step();
        }
        assert_eq!(c.step(), 720);
        assert!((c.trend_multiplier() - 1.1).abs() < 1e-12);
        assert_eq!(c.apply_trend(60), 66);
    }

    #[test]
    fn test_describe() {
        let probe = FixedProbe::new(3_450_000);
        let c = controller(&probe);
        let d = c.describe();
        assert!(d.contains("maximum memory: 100 MB"));
        assert!(d.contains("chunk size: 1 MB"));
        assert!(d.contains("initial allocation: 3 MB"));
        assert!(d.contains("correction rest: 0 MB"));
    }
}
