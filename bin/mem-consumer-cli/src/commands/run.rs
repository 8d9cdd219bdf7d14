// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mem-consumer run` command: replay a pattern as memory pressure.
//!
//! ```text
//! Driver<Idle> → start → Driver<Running> → run(Ctrl-C) → RunMetrics
//! ```

use driver::{ConsumerConfig, Driver, Shutdown};
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct RunArgs {
    /// CSV file with a memory consumption pattern (percent of maximal memory per time slot).
    #[arg(short = 'f', long)]
    pattern_file: Option<PathBuf>,

    /// Noise in percent applied to the pattern values [default: 0].
    #[arg(short, long)]
    noise_percent: Option<u32>,

    /// Memory in MB allocated when the pattern value is 100 [default: 1000].
    /// The MAX_RAM_MEGA environment variable takes precedence.
    #[arg(short, long)]
    max_ram_mega: Option<u64>,

    /// Seconds between allocation changes [default: 5].
    #[arg(short, long)]
    time_slot_sec: Option<u64>,

    /// Slope of the linear trend over one pattern cycle [default: 0.0].
    #[arg(short, long, allow_negative_numbers = true)]
    slope_linear_trend: Option<f64>,

    /// Follow the pattern from its beginning instead of the current time.
    #[arg(short = 'b', long)]
    start_from_beginning: bool,

    /// Run time in seconds; negative runs until Ctrl-C [default: -1].
    #[arg(short, long, allow_negative_numbers = true)]
    duration_sec: Option<i64>,

    /// Seed for reproducible noise.
    #[arg(long)]
    seed: Option<u64>,
}

impl RunArgs {
    /// Layers explicit flags over the config file, if any.
    fn into_config(self, config_path: Option<PathBuf>) -> anyhow::Result<ConsumerConfig> {
        let mut config = match (config_path, self.pattern_file.clone()) {
            (Some(path), _) => ConsumerConfig::from_file(&path)?,
            (None, Some(pattern)) => ConsumerConfig::new(pattern),
            (None, None) => anyhow::bail!("a pattern file is required: pass -f/--pattern-file or --config"),
        };

        if let Some(pattern) = self.pattern_file {
            config.pattern_path = pattern;
        }
        if let Some(noise) = self.noise_percent {
            config.noise_percent = noise;
        }
        if let Some(mega) = self.max_ram_mega {
            config.max_ram_mega = mega;
        }
        if let Some(tick) = self.time_slot_sec {
            config.time_slot_sec = tick;
        }
        if let Some(slope) = self.slope_linear_trend {
            config.linear_trend_slope = slope;
        }
        if self.start_from_beginning {
            config.start_from_beginning = true;
        }
        if let Some(duration) = self.duration_sec {
            config.duration_sec = duration;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

pub async fn execute(config_path: Option<PathBuf>, args: RunArgs) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            mem-consumer · Pattern Runner             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Configuration ──────────────────────────────────────────
    let mut config = args.into_config(config_path)?;
    config.apply_env_override()?;
    config.validate()?;

    println!("  Config:");
    println!("   Pattern:  {}", config.pattern_path.display());
    println!("   Noise:    +/- {}%", config.noise_percent);
    println!("   {}", config.summary());
    println!();

    print_memory("Before");

    // ── Driver ─────────────────────────────────────────────────
    let driver = Driver::new(config)?;
    println!(
        "  Start time: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!();

    let metrics = driver.start().run(Shutdown::on_ctrl_c()).await?;

    println!();
    println!("  Run:");
    println!("   {}", metrics.summary());
    println!();
    print_memory("After");

    Ok(())
}

/// Prints a memory snapshot; a missing procfs only warns.
fn print_memory(label: &str) {
    match resource_monitor::snapshot() {
        Ok(snapshot) => {
            println!("  {label}:");
            println!("   {}", snapshot.summary());
            println!();
        }
        Err(e) => tracing::warn!("memory snapshot unavailable: {e}"),
    }
}
