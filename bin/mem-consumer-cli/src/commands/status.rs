// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mem-consumer status` command: display process and system memory.
//!
//! Reads `/proc/self/status` and `/proc/meminfo`; the command fails if
//! procfs is not mounted.

pub async fn execute() -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            mem-consumer · Memory Status              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let snapshot = resource_monitor::snapshot()?;

    // ── Process ────────────────────────────────────────────────
    println!("  Process");
    println!("   Resident:     {} MB", snapshot.process.resident_mb());
    println!(
        "   Peak:         {} MB",
        snapshot.process.peak_resident_bytes / resource_monitor::MEGA
    );
    println!(
        "   Virtual:      {} MB",
        snapshot.process.virtual_bytes / resource_monitor::MEGA
    );
    println!();

    // ── System ─────────────────────────────────────────────────
    println!("  System");
    let ratio = snapshot.system.utilisation();
    println!("   Total:        {} MB", snapshot.system.total_mb());
    println!("   Available:    {} MB", snapshot.system.available_mb());
    println!("   Free:         {} MB", snapshot.system.free_mb());
    println!(
        "   Used:         {} MB ({:.1}%)  {}",
        snapshot.system.used_mb(),
        ratio * 100.0,
        usage_bar(ratio)
    );
    println!();

    // ── Overall Assessment ─────────────────────────────────────
    println!("  Assessment");
    if snapshot.is_memory_constrained() {
        println!("   Status:       MEMORY CONSTRAINED");
    } else {
        println!("   Status:       System healthy");
    }
    let safe_max = snapshot.system.available_mb() * 3 / 4;
    println!("   Safe maximum: ~{safe_max} MB for -m (75% of available)");
    println!();
    println!("{}", snapshot.summary());

    Ok(())
}

/// Creates a visual usage bar (0.0-1.0 scale).
fn usage_bar(ratio: f64) -> String {
    let filled = (ratio * 20.0).round() as usize;
    let filled = filled.min(20);
    let empty = 20 - filled;
    let symbol = if ratio >= 0.9 {
        "#"
    } else if ratio >= 0.7 {
        "="
    } else {
        "-"
    };
    format!("[{}{}]", symbol.repeat(filled), ".".repeat(empty))
}
