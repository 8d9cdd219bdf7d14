// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mem-consumer inspect` command: describe a pattern file without
//! allocating anything.

use load_pattern::{Noise, PatternTable};
use std::path::PathBuf;

pub async fn execute(pattern_file: PathBuf, noise_percent: u32) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            mem-consumer · Pattern Inspector          ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let table = PatternTable::from_path(&pattern_file, Noise::new(noise_percent))?;
    let now = chrono::Local::now().naive_local();
    let start = table.start_of_cycle(now);

    println!("  {table}");
    println!();
    println!("  Cycle");
    println!("   Granularity:  {}", table.granularity());
    println!("   Resolution:   {}", table.resolution());
    println!("   Length:       {} s", table.cycle_seconds());
    let calendar = table.granularity().natural_cycle_seconds();
    if table.cycle_seconds() != calendar {
        println!("   WARNING: rows span {} s of the {calendar} s calendar cycle", table.cycle_seconds());
    }
    println!("   Started at:   {}", start.format("%Y-%m-%d %H:%M:%S"));
    println!(
        "   Position:     {} s into the cycle",
        table.time_shift_from_start(now).num_seconds()
    );
    println!();

    let (lo, hi) = table.bounds_at(now)?;
    println!("  Values");
    println!(
        "   At start:     {}%  (key {})",
        table.value_at(start)?,
        table.key_for(start)
    );
    println!(
        "   Now:          {}%  (key {}, with noise {lo}..={hi}%)",
        table.value_at(now)?,
        table.key_for(now)
    );
    println!();

    Ok(())
}
