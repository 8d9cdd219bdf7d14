// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tick-loop behaviour under paused tokio time.
//!
//! The probe replays scripted resident-memory readings so drift handling is
//! deterministic, and the clock follows tokio's paused clock so a 5-second
//! tick advances pattern time by exactly 5 seconds.

use chrono::{NaiveDate, NaiveDateTime};
use driver::{shutdown, Clock, ConsumerConfig, Driver, DriverError, Shutdown, TickReport};
use load_pattern::{Noise, PatternError, PatternTable};
use memory_manager::{AllocationController, MemoryBudget, MemoryError, MemoryProbe};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const MB: u64 = 1_000_000;

// ── Helpers ────────────────────────────────────────────────────

/// Returns scripted readings in order, repeating the last one.
#[derive(Debug, Clone)]
struct ScriptedProbe {
    readings: Arc<Mutex<VecDeque<u64>>>,
    last: Arc<Mutex<u64>>,
}

impl ScriptedProbe {
    fn new(readings: impl IntoIterator<Item = u64>) -> Self {
        Self {
            readings: Arc::new(Mutex::new(readings.into_iter().collect())),
            last: Arc::new(Mutex::new(0)),
        }
    }
}

impl MemoryProbe for ScriptedProbe {
    fn resident_bytes(&self) -> Result<u64, MemoryError> {
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.readings.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(*last)
    }
}

/// Wall clock anchored at `origin` that advances with tokio time.
struct PausedClock {
    origin: NaiveDateTime,
    start: tokio::time::Instant,
}

impl PausedClock {
    fn at(origin: NaiveDateTime) -> Self {
        Self {
            origin,
            start: tokio::time::Instant::now(),
        }
    }
}

impl Clock for PausedClock {
    fn now(&self) -> NaiveDateTime {
        self.origin + chrono::Duration::from_std(self.start.elapsed()).unwrap()
    }
}

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn half_minute_table(first: u32, second: u32) -> PatternTable {
    let csv = format!("s,value\n0,{first}\n30,{second}\n");
    PatternTable::from_csv_str("s.csv", &csv, Noise::none()).unwrap()
}

/// 100 MB maximum so one chunk (one percent) is 1 MB.
fn config(duration_sec: i64) -> ConsumerConfig {
    ConsumerConfig {
        max_ram_mega: 100,
        duration_sec,
        ..ConsumerConfig::new("s.csv")
    }
}

/// Baseline reading of zero followed by readings that match each target.
fn mirroring_probe(targets: &[u32]) -> ScriptedProbe {
    let readings = std::iter::once(0).chain(targets.iter().map(|&t| u64::from(t) * MB));
    ScriptedProbe::new(readings)
}

fn collect_reports() -> (Arc<Mutex<Vec<TickReport>>>, impl FnMut(&TickReport) + Send) {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    (reports, move |r: &TickReport| sink.lock().unwrap().push(r.clone()))
}

fn build_driver(
    config: ConsumerConfig,
    table: PatternTable,
    probe: ScriptedProbe,
    origin: NaiveDateTime,
) -> Driver<driver::Idle, ScriptedProbe> {
    let controller = AllocationController::with_probe(config.budget().unwrap(), probe).unwrap();
    Driver::from_parts(config, table, controller)
        .unwrap()
        .with_clock(PausedClock::at(origin))
}

// ── Tick loop ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_follows_pattern_for_duration() {
    let expected: Vec<u32> = [60; 6].into_iter().chain([10; 6]).collect();
    let (reports, observer) = collect_reports();

    let metrics = build_driver(
        config(60),
        half_minute_table(60, 10),
        mirroring_probe(&expected),
        at(9, 0, 0),
    )
    .on_tick(observer)
    .start()
    .run(Shutdown::never())
    .await
    .unwrap();

    assert_eq!(metrics.ticks, 12);
    assert_eq!(metrics.drift_resets, 0);
    assert_eq!(metrics.peak_target_percent, 60);
    assert_eq!(metrics.peak_tracked_bytes, 60 * MB);
    assert!(!metrics.cancelled);

    let reports = reports.lock().unwrap();
    let targets: Vec<u32> = reports.iter().map(|r| r.target_percent).collect();
    assert_eq!(targets, expected);
    assert_eq!(reports[0].timestamp, at(9, 0, 0));
    assert_eq!(reports[6].timestamp, at(9, 0, 30));
    assert_eq!(reports[11].step, 11);
    assert!(reports[6].status_line().contains("Allocated 10% of 100 MB"));
}

#[tokio::test(start_paused = true)]
async fn test_start_from_beginning_shifts_phase() {
    let mut cfg = config(5);
    cfg.start_from_beginning = true;

    let (reports, observer) = collect_reports();
    let running = build_driver(cfg, half_minute_table(60, 10), mirroring_probe(&[60]), at(9, 0, 40))
        .on_tick(observer)
        .start();
    assert_eq!(running.phase_shift(), chrono::Duration::seconds(40));

    let metrics = running.run(Shutdown::never()).await.unwrap();
    assert_eq!(metrics.ticks, 1);
    assert_eq!(reports.lock().unwrap()[0].target_percent, 60);
}

#[tokio::test(start_paused = true)]
async fn test_follows_wall_clock_by_default() {
    let (reports, observer) = collect_reports();
    let running = build_driver(config(5), half_minute_table(60, 10), mirroring_probe(&[10]), at(9, 0, 40))
        .on_tick(observer)
        .start();
    assert_eq!(running.phase_shift(), chrono::Duration::zero());

    running.run(Shutdown::never()).await.unwrap();
    assert_eq!(reports.lock().unwrap()[0].target_percent, 10);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_between_ticks_is_clean() {
    let (trigger, listener) = shutdown::channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(12)).await;
        trigger.trigger();
    });

    let metrics = build_driver(
        config(-1),
        half_minute_table(20, 20),
        mirroring_probe(&[20; 8]),
        at(9, 0, 0),
    )
    .start()
    .run(listener)
    .await
    .unwrap();

    // Ticks at 0s, 5s and 10s; the request lands during the third sleep.
    assert!(metrics.cancelled);
    assert_eq!(metrics.ticks, 3);
}

#[tokio::test(start_paused = true)]
async fn test_trend_scales_targets() {
    let mut cfg = config(65);
    cfg.linear_trend_slope = 1.0;

    // A 60 s cycle with 5 s ticks is 12 steps.
    let expected: Vec<u32> = (0..13u32)
        .map(|k| (50.0 * (1.0 + f64::from(k) / 12.0)) as u32)
        .collect();
    assert_eq!(expected[0], 50);
    assert_eq!(expected[12], 100);

    let (reports, observer) = collect_reports();
    let metrics = build_driver(cfg, half_minute_table(50, 50), mirroring_probe(&expected), at(9, 0, 0))
        .on_tick(observer)
        .start()
        .run(Shutdown::never())
        .await
        .unwrap();

    assert_eq!(metrics.ticks, 13);
    let targets: Vec<u32> = reports.lock().unwrap().iter().map(|r| r.target_percent).collect();
    assert_eq!(targets, expected);
}

#[tokio::test(start_paused = true)]
async fn test_drift_reset_is_reported_not_fatal() {
    // Third reading is 10 MB above the 30 MB tracked: beyond 3 chunks.
    let probe = ScriptedProbe::new([0, 30 * MB, 30 * MB, 40 * MB, 30 * MB]);
    let (reports, observer) = collect_reports();

    let metrics = build_driver(config(20), half_minute_table(30, 30), probe, at(9, 0, 0))
        .on_tick(observer)
        .start()
        .run(Shutdown::never())
        .await
        .unwrap();

    assert_eq!(metrics.ticks, 4);
    assert_eq!(metrics.drift_resets, 1);
    let resets: Vec<bool> = reports.lock().unwrap().iter().map(|r| r.drift_reset).collect();
    assert_eq!(resets, vec![false, false, true, false]);
}

#[tokio::test(start_paused = true)]
async fn test_lookup_miss_is_fatal() {
    // Only minute 0 is covered.
    let table =
        PatternTable::from_csv_str("ms.csv", "m,s,value\n0,0,10\n0,30,20\n", Noise::none()).unwrap();

    let result = build_driver(config(60), table, mirroring_probe(&[]), at(9, 5, 0))
        .start()
        .run(Shutdown::never())
        .await;

    assert!(matches!(
        result,
        Err(DriverError::Pattern(PatternError::Lookup { .. }))
    ));
}

// ── Construction ───────────────────────────────────────────────

#[test]
fn test_invalid_config_rejected_before_loading() {
    let cfg = ConsumerConfig {
        max_ram_mega: 50,
        ..ConsumerConfig::new("/nonexistent/pattern.csv")
    };
    assert!(matches!(Driver::new(cfg), Err(DriverError::Config(_))));
}

#[test]
fn test_missing_pattern_file() {
    let cfg = ConsumerConfig::new("/nonexistent/pattern.csv");
    assert!(matches!(
        Driver::new(cfg),
        Err(DriverError::Pattern(PatternError::Io { .. }))
    ));
}

#[test]
fn test_new_loads_pattern_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("m.csv");
    let rows: String = (0..60).map(|m| format!("{m},{}\n", 20 + m)).collect();
    std::fs::write(&path, format!("m,value\n{rows}")).unwrap();

    let cfg = ConsumerConfig {
        linear_trend_slope: 0.5,
        time_slot_sec: 10,
        ..ConsumerConfig::new(&path)
    };
    let driver = Driver::new(cfg).unwrap();
    assert_eq!(driver.table().cycle_seconds(), 3600);
    assert_eq!(driver.controller().trend().steps_per_cycle(), 360);
    assert_eq!(driver.controller().budget(), MemoryBudget::from_mb(1000));
    assert_eq!(driver.controller().owned_chunks(), 0);
}
