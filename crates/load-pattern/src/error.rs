// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for pattern loading and lookup.

use crate::PatternKey;

/// Errors that can occur when building or querying a pattern table.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// Failed to read a pattern file.
    #[error("failed to read pattern '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The pattern data is malformed. `line` is 1-based; 0 means the
    /// problem concerns the data as a whole.
    #[error("malformed pattern (line {line}): {detail}")]
    Format { line: usize, detail: String },

    /// No row covers the bucket an instant maps to. The pattern does not
    /// cover a full cycle.
    #[error("pattern has no value for key {key}")]
    Lookup { key: PatternKey },
}

impl PatternError {
    pub(crate) fn format(line: usize, detail: impl Into<String>) -> Self {
        Self::Format {
            line,
            detail: detail.into(),
        }
    }
}
