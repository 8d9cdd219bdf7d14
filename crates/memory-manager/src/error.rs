// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for memory management.

/// Errors that can occur while configuring or driving the allocation controller.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The configured maximum memory is below the supported minimum.
    #[error("maximum memory {budget_mb} MB is below the minimum of {min_mb} MB")]
    BudgetTooSmall { budget_mb: usize, min_mb: usize },

    /// The configured maximum memory does not fit in the address space.
    #[error("maximum memory {budget_mb} MB does not fit in the address space")]
    BudgetTooLarge { budget_mb: u64 },

    /// Process memory could not be measured.
    #[error("cannot measure process memory: {0}")]
    Probe(#[from] resource_monitor::MonitorError),
}
