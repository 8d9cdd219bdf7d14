// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Linear drift applied on top of pattern values.

/// A linear bias of `slope` per full pattern cycle.
///
/// At step `n` the target is scaled by `1 + n · slope / steps_per_cycle`,
/// where `steps_per_cycle = cycle_seconds / tick_seconds` (integer division).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    slope: f64,
    steps_per_cycle: u64,
}

impl Trend {
    /// Builds a trend for a pattern cycle sampled every `tick_seconds`.
    ///
    /// A tick longer than the cycle counts as one step per cycle.
    pub fn new(slope: f64, cycle_seconds: u64, tick_seconds: u64) -> Self {
        let steps_per_cycle = (cycle_seconds / tick_seconds.max(1)).max(1);
        Self {
            slope,
            steps_per_cycle,
        }
    }

    /// A trend that never changes the target.
    pub fn flat() -> Self {
        Self {
            slope: 0.0,
            steps_per_cycle: 1,
        }
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn steps_per_cycle(&self) -> u64 {
        self.steps_per_cycle
    }

    /// `true` when the slope is non-zero. Negative slopes bias downward.
    pub fn is_active(&self) -> bool {
        self.slope != 0.0
    }

    /// Multiplier for tick `step`.
    pub fn multiplier(&self, step: u64) -> f64 {
        1.0 + step as f64 * self.slope / self.steps_per_cycle as f64
    }

    /// Applies the multiplier to a percentage, truncating and flooring at 0.
    pub fn apply(&self, percent: u32, step: u64) -> u32 {
        if !self.is_active() {
            return percent;
        }
        let scaled = f64::from(percent) * self.multiplier(step);
        if scaled <= 0.0 {
            0
        } else {
            scaled as u32
        }
    }
}

impl Default for Trend {
    fn default() -> Self {
        Self::flat()
    }
}
