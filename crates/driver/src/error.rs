// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the consumer driver.

/// Errors that stop a run before or during ticking.
///
/// Memory drift and cancellation are not errors; they are handled inside
/// the loop.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The pattern file is malformed or does not cover the current time.
    #[error("pattern error: {0}")]
    Pattern(#[from] load_pattern::PatternError),

    /// The controller rejected the budget or could not measure memory.
    #[error("memory error: {0}")]
    Memory(#[from] memory_manager::MemoryError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
