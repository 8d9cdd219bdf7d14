// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Measured resident memory follows the tracked footprint on a real
//! process. Kept in its own test binary so no other test allocates
//! concurrently.

use memory_manager::{AllocationController, MemoryBudget};

#[tokio::test]
async fn test_resident_memory_converges_to_target() {
    let mut controller = AllocationController::new(MemoryBudget::from_mb(200)).unwrap();
    let chunk = controller.chunk_size() as u64;

    for target in [20, 60, 120, 40, 20] {
        controller.change_allocation(target).await;
        let measured = controller.measured_bytes().unwrap();
        let tracked = controller.tracked_bytes();
        assert!(
            measured.abs_diff(tracked) < 2 * chunk,
            "target {target}%: measured {measured} vs tracked {tracked}"
        );
    }

    let drift = controller.check_drift().unwrap();
    assert!(!drift.reset);
}
