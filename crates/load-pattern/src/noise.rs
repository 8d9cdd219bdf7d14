// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Bounded uniform noise applied to looked-up values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Perturbs values by up to `±percent` of their magnitude.
///
/// The generator is owned so a seeded source gives reproducible output.
#[derive(Debug, Clone)]
pub struct Noise {
    percent: u32,
    rng: StdRng,
}

impl Noise {
    /// Noise drawn from an entropy-seeded generator.
    pub fn new(percent: u32) -> Self {
        Self::with_rng(percent, StdRng::from_entropy())
    }

    /// Noise drawn from a generator seeded with `seed`.
    pub fn seeded(percent: u32, seed: u64) -> Self {
        Self::with_rng(percent, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(percent: u32, rng: StdRng) -> Self {
        Self { percent, rng }
    }

    /// No noise at all; [`apply`](Self::apply) returns its input.
    pub fn none() -> Self {
        Self::seeded(0, 0)
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// Returns the bounds `[max(0, v - margin), v + margin]` for `value`,
    /// where `margin = value * percent / 100` (integer division).
    pub fn bounds(&self, value: u32) -> (u32, u32) {
        let margin = (u64::from(value) * u64::from(self.percent) / 100) as u32;
        (value.saturating_sub(margin), value.saturating_add(margin))
    }

    /// Draws a value uniformly from [`bounds`](Self::bounds).
    pub fn apply(&mut self, value: u32) -> u32 {
        if self.percent == 0 {
            return value;
        }
        let (lo, hi) = self.bounds(value);
        self.rng.gen_range(lo..=hi)
    }
}
