// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A single growable byte region measured in fixed-size chunks.
//!
//! The controller thinks in chunks (1% of the maximum memory each), but
//! keeping one heap object per chunk buys nothing: the region is one
//! `Vec<u8>` whose length is always
//!
//! ```text
//! chunks == 0  →  0
//! chunks  > 0  →  chunks × chunk_size − first_chunk_shortfall
//! ```
//!
//! The shortfall is the baseline remainder the process already held at
//! startup; taking it off the first chunk keeps the running total aligned
//! to whole chunks.
//!
//! Every byte handed out is written so the pages are actually committed
//! and show up in the resident set.

/// Byte written into newly grown memory.
const FILL_BYTE: u8 = 0xA5;

/// Chunked byte region backing the controller's allocation.
#[derive(Debug)]
pub struct ChunkArena {
    region: Vec<u8>,
    chunk_size: usize,
    chunks: usize,
    first_chunk_shortfall: usize,
}

impl ChunkArena {
    /// Creates an empty arena.
    ///
    /// `first_chunk_shortfall` is clamped below `chunk_size`.
    pub fn new(chunk_size: usize, first_chunk_shortfall: usize) -> Self {
        Self {
            region: Vec::new(),
            chunk_size,
            chunks: 0,
            first_chunk_shortfall: first_chunk_shortfall.min(chunk_size.saturating_sub(1)),
        }
    }

    /// Number of logical chunks held.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Bytes actually held by the region.
    pub fn len_bytes(&self) -> usize {
        self.region.len()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Region length that corresponds to `chunks` chunks.
    pub fn bytes_for(&self, chunks: usize) -> usize {
        if chunks == 0 {
            0
        } else {
            chunks * self.chunk_size - self.first_chunk_shortfall
        }
    }

    /// Resizes the region to hold exactly `chunks` chunks.
    ///
    /// Returns the signed change in chunk count.
    pub fn resize_to(&mut self, chunks: usize) -> isize {
        let before = self.chunks;
        let target_len = self.bytes_for(chunks);

        if chunks > before {
            self.region.reserve_exact(target_len - self.region.len());
            self.region.resize(target_len, FILL_BYTE);
        } else if chunks < before {
            self.region.truncate(target_len);
            self.region.shrink_to_fit();
        }
        self.chunks = chunks;

        debug_assert_eq!(self.region.len(), self.bytes_for(self.chunks));
        chunks as isize - before as isize
    }

    /// Releases the whole region back to the allocator.
    pub fn clear(&mut self) {
        self.region = Vec::new();
        self.chunks = 0;
    }

    /// `true` if the region length matches the chunk count.
    pub fn is_consistent(&self) -> bool {
        self.region.len() == self.bytes_for(self.chunks)
    }
}
