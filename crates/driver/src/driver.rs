// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The tick loop with a type-state–enforced lifecycle.
//!
//! ```text
//! Driver<Idle>
//!     │  .start()        fixes the phase shift
//!     ▼
//! Driver<Running>
//!     │  .run(shutdown)  ticks until the duration elapses or shutdown
//!     ▼
//!   RunMetrics           controller dropped, memory released
//! ```
//!
//! Each tick samples the pattern at `now − phase_shift`, scales the value by
//! the trend, moves the allocation, logs a status line, checks for drift and
//! then sleeps for the rest of the tick interval.

use crate::{Clock, ConsumerConfig, DriverError, RunMetrics, Shutdown, SystemClock, TickReport};
use load_pattern::PatternTable;
use memory_manager::{AllocationController, MemoryProbe, ProcfsProbe};

// ── Type-state markers ─────────────────────────────────────────

/// Driver is configured but has not sampled the clock.
#[derive(Debug)]
pub struct Idle;

/// Phase shift is fixed and the driver can tick.
#[derive(Debug)]
pub struct Running;

/// Sealed trait for driver states.
pub trait DriverState: std::fmt::Debug {}
impl DriverState for Idle {}
impl DriverState for Running {}

type Observer = Box<dyn FnMut(&TickReport) + Send>;

/// Replays a pattern through an [`AllocationController`].
///
/// # Example
/// ```no_run
/// use driver::{ConsumerConfig, Driver, Shutdown};
///
/// # async fn example() -> Result<(), driver::DriverError> {
/// let mut config = ConsumerConfig::new("patterns/dhm.csv");
/// config.duration_sec = 60;
/// let metrics = Driver::new(config)?.start().run(Shutdown::on_ctrl_c()).await?;
/// println!("{}", metrics.summary());
/// # Ok(())
/// # }
/// ```
pub struct Driver<S: DriverState = Idle, P: MemoryProbe = ProcfsProbe> {
    config: ConsumerConfig,
    table: PatternTable,
    controller: AllocationController<P>,
    clock: Box<dyn Clock>,
    observer: Option<Observer>,
    phase_shift: chrono::Duration,
    _state: std::marker::PhantomData<S>,
}

impl Driver<Idle> {
    /// Validates the configuration, loads the pattern and measures the
    /// process baseline.
    ///
    /// Nothing is allocated until the first tick.
    pub fn new(config: ConsumerConfig) -> Result<Self, DriverError> {
        config.validate()?;
        let table = config.load_pattern()?;
        let controller = AllocationController::new(config.budget()?)?;
        Self::from_parts(config, table, controller)
    }
}

impl<P: MemoryProbe> Driver<Idle, P> {
    /// Assembles a driver from an already loaded table and controller.
    ///
    /// The controller's trend is replaced by the one the configuration
    /// describes for this table's cycle.
    pub fn from_parts(
        config: ConsumerConfig,
        table: PatternTable,
        controller: AllocationController<P>,
    ) -> Result<Self, DriverError> {
        config.validate()?;
        let trend = config.trend(table.cycle_seconds());
        tracing::info!("{table}");
        tracing::info!("{}", controller.describe());
        if trend.is_active() {
            tracing::info!(
                "linear trend: slope {} over {} ticks",
                trend.slope(),
                trend.steps_per_cycle()
            );
        }

        Ok(Self {
            controller: controller.with_trend(trend),
            config,
            table,
            clock: Box::new(SystemClock),
            observer: None,
            phase_shift: chrono::Duration::zero(),
            _state: std::marker::PhantomData,
        })
    }

    /// Replaces the wall clock.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Registers a callback invoked with every tick report.
    pub fn on_tick(mut self, observer: impl FnMut(&TickReport) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Fixes the phase shift and transitions to `Running`.
    ///
    /// With `start_from_beginning` the pattern is replayed from its cycle
    /// start; otherwise it follows the wall clock.
    pub fn start(self) -> Driver<Running, P> {
        let phase_shift = if self.config.start_from_beginning {
            let shift = self.table.time_shift_from_start(self.clock.now());
            tracing::info!("starting from the pattern beginning, phase shift {}s", shift.num_seconds());
            shift
        } else {
            chrono::Duration::zero()
        };

        Driver {
            config: self.config,
            table: self.table,
            controller: self.controller,
            clock: self.clock,
            observer: self.observer,
            phase_shift,
            _state: std::marker::PhantomData,
        }
    }
}

impl<S: DriverState, P: MemoryProbe> Driver<S, P> {
    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    pub fn controller(&self) -> &AllocationController<P> {
        &self.controller
    }
}

impl<P: MemoryProbe> Driver<Running, P> {
    /// Offset subtracted from the wall clock before each lookup.
    pub fn phase_shift(&self) -> chrono::Duration {
        self.phase_shift
    }

    /// Runs a single tick without the trailing sleep.
    ///
    /// A lookup miss is returned as an error; drift is handled here and only
    /// reported.
    pub async fn tick(&mut self) -> Result<TickReport, DriverError> {
        let now = self.clock.now();
        let value = self.table.lookup(now - self.phase_shift)?;
        let target_percent = self.controller.apply_trend(value);

        self.controller.change_allocation(target_percent).await;
        let drift = self.controller.check_drift()?;

        let report = TickReport {
            timestamp: now,
            step: self.controller.step(),
            target_percent,
            max_ram_mega: self.config.max_ram_mega,
            tracked_bytes: drift.tracked_bytes,
            measured_bytes: drift.measured_bytes,
            tick: self.config.tick(),
            drift_reset: drift.reset,
        };
        tracing::info!("{}", report.status_line());

        if let Some(observer) = self.observer.as_mut() {
            observer(&report);
        }
        self.controller.advance_step();
        Ok(report)
    }

    /// Ticks until the configured duration elapses or `shutdown` fires.
    ///
    /// Shutdown is only observed between ticks and ends the run with
    /// `Ok`, flagged as cancelled.
    pub async fn run(mut self, mut shutdown: Shutdown) -> Result<RunMetrics, DriverError> {
        let limit = self.config.tick_limit();
        let pause = self
            .config
            .tick()
            .saturating_sub(self.controller.settle_time());
        let mut metrics = RunMetrics::default();

        tracing::info!(
            "start time: {}",
            self.clock.now().format("%Y-%m-%d %H:%M:%S")
        );

        loop {
            let report = self.tick().await?;
            metrics.record(&report);

            tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    metrics.cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(pause) => {}
            }

            if limit.is_some_and(|n| metrics.ticks >= n) {
                break;
            }
        }

        let stats = self.controller.stats();
        metrics.peak_tracked_bytes = metrics.peak_tracked_bytes.max(stats.peak_tracked_bytes);
        tracing::debug!("{}", stats.summary());
        tracing::info!("run finished: {}", metrics.summary());
        Ok(metrics)
    }
}
