// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Consumer configuration loaded from TOML files or built from CLI flags.
//!
//! # TOML Format
//! ```toml
//! pattern_path = "./patterns/dhm.csv"
//! noise_percent = 5
//! max_ram_mega = 2000
//! time_slot_sec = 5
//! linear_trend_slope = 0.2
//! start_from_beginning = true
//! duration_sec = 3600
//! seed = 42
//! ```
//!
//! Only `pattern_path` is required. The `MAX_RAM_MEGA` environment variable
//! overrides `max_ram_mega` wherever it came from.

use crate::DriverError;
use load_pattern::{Noise, PatternTable};
use memory_manager::{MemoryBudget, Trend};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the maximum memory.
pub const MAX_RAM_ENV: &str = "MAX_RAM_MEGA";

/// Configuration for a consumer run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConsumerConfig {
    /// CSV file with the load pattern.
    pub pattern_path: PathBuf,
    /// Noise in percent applied to every pattern value.
    #[serde(default)]
    pub noise_percent: u32,
    /// Memory allocated when the pattern value is 100, in decimal MB.
    #[serde(default = "default_max_ram_mega")]
    pub max_ram_mega: u64,
    /// Seconds between allocation changes.
    #[serde(default = "default_time_slot_sec")]
    pub time_slot_sec: u64,
    /// Slope of the linear trend over one pattern cycle.
    #[serde(default)]
    pub linear_trend_slope: f64,
    /// Follow the pattern from its cycle start instead of the current time.
    #[serde(default)]
    pub start_from_beginning: bool,
    /// Run length in seconds; negative runs until interrupted.
    #[serde(default = "default_duration_sec")]
    pub duration_sec: i64,
    /// Seed for reproducible noise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_max_ram_mega() -> u64 {
    1000
}

fn default_time_slot_sec() -> u64 {
    5
}

fn default_duration_sec() -> i64 {
    -1
}

impl ConsumerConfig {
    /// Creates a configuration with defaults for everything but the pattern.
    pub fn new(pattern_path: impl Into<PathBuf>) -> Self {
        Self {
            pattern_path: pattern_path.into(),
            noise_percent: 0,
            max_ram_mega: default_max_ram_mega(),
            time_slot_sec: default_time_slot_sec(),
            linear_trend_slope: 0.0,
            start_from_beginning: false,
            duration_sec: default_duration_sec(),
            seed: None,
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DriverError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DriverError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, DriverError> {
        toml::from_str(toml_str)
            .map_err(|e| DriverError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, DriverError> {
        toml::to_string_pretty(self)
            .map_err(|e| DriverError::Config(format!("TOML serialise error: {e}")))
    }

    /// Applies `MAX_RAM_MEGA` from the process environment, if set.
    pub fn apply_env_override(&mut self) -> Result<bool, DriverError> {
        let value = std::env::var(MAX_RAM_ENV).ok();
        self.override_max_ram(value.as_deref())
    }

    /// Replaces `max_ram_mega` with an override value.
    ///
    /// Returns whether the value changed.
    pub fn override_max_ram(&mut self, value: Option<&str>) -> Result<bool, DriverError> {
        let Some(raw) = value else {
            return Ok(false);
        };
        let mega: u64 = raw.trim().parse().map_err(|_| {
            DriverError::Config(format!("{MAX_RAM_ENV}='{raw}' is not a number of megabytes"))
        })?;
        if mega == self.max_ram_mega {
            return Ok(false);
        }
        tracing::info!(
            "max_ram_mega {} has been overwritten by variable {MAX_RAM_ENV}={mega}",
            self.max_ram_mega
        );
        self.max_ram_mega = mega;
        Ok(true)
    }

    /// Checks ranges before anything is allocated.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.max_ram_mega < MemoryBudget::MIN_MB as u64 {
            return Err(DriverError::Config(format!(
                "max_ram_mega must be >= {}, got {}",
                MemoryBudget::MIN_MB,
                self.max_ram_mega
            )));
        }
        MemoryBudget::try_from_mb(self.max_ram_mega)
            .map_err(|e| DriverError::Config(format!("max_ram_mega: {e}")))?;
        if self.time_slot_sec == 0 {
            return Err(DriverError::Config("time_slot_sec must be positive".into()));
        }
        if self.noise_percent > 100 {
            return Err(DriverError::Config(format!(
                "noise_percent must be within 0..=100, got {}",
                self.noise_percent
            )));
        }
        if !self.linear_trend_slope.is_finite() {
            return Err(DriverError::Config("linear_trend_slope must be finite".into()));
        }
        Ok(())
    }

    /// Maximum memory as a budget.
    pub fn budget(&self) -> Result<MemoryBudget, DriverError> {
        Ok(MemoryBudget::try_from_mb(self.max_ram_mega)?)
    }

    /// Tick interval.
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.time_slot_sec)
    }

    /// Number of ticks to run, or `None` to run until cancelled.
    pub fn tick_limit(&self) -> Option<u64> {
        if self.duration_sec < 0 || self.time_slot_sec == 0 {
            return None;
        }
        Some((self.duration_sec as u64 / self.time_slot_sec).max(1))
    }

    /// Noise source: seeded when `seed` is set.
    pub fn noise(&self) -> Noise {
        match self.seed {
            Some(seed) => Noise::seeded(self.noise_percent, seed),
            None => Noise::new(self.noise_percent),
        }
    }

    /// Loads the pattern table with this configuration's noise.
    pub fn load_pattern(&self) -> Result<PatternTable, DriverError> {
        Ok(PatternTable::from_path(&self.pattern_path, self.noise())?)
    }

    /// One-line description of the run parameters.
    pub fn summary(&self) -> String {
        let duration = if self.duration_sec < 0 {
            "infinite".to_string()
        } else {
            format!("{}s", self.duration_sec)
        };
        format!(
            "maximum memory: {}MB, allocation change interval: {}s, linear trend slope {}, \
             start from pattern beginning: {}, duration: {duration}",
            self.max_ram_mega, self.time_slot_sec, self.linear_trend_slope, self.start_from_beginning,
        )
    }

    /// Trend for a pattern with the given cycle length.
    pub fn trend(&self, cycle_seconds: u64) -> Trend {
        Trend::new(self.linear_trend_slope, cycle_seconds, self.time_slot_sec)
    }
}
