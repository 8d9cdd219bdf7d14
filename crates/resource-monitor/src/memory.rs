// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! System memory monitoring via `/proc/meminfo`.
//!
//! Parses key fields from `/proc/meminfo` to report total, available,
//! free, and used memory alongside the load generator's own footprint.

use crate::procfs::{read_proc_file, require_kb_field};
use crate::{MonitorError, MEGA};
use std::path::Path;

/// Default path to the kernel memory info file.
const MEMINFO_PATH: &str = "/proc/meminfo";

/// System memory state.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MemoryInfo {
    /// Total physical memory in bytes.
    pub total_bytes: u64,
    /// Available memory (as reported by the kernel) in bytes.
    ///
    /// This accounts for free memory, buffers, and reclaimable cache.
    pub available_bytes: u64,
    /// Completely unused memory in bytes.
    pub free_bytes: u64,
    /// Memory actively used in bytes (`total - available`).
    pub used_bytes: u64,
}

impl MemoryInfo {
    /// Reads current memory information from `/proc/meminfo`.
    pub fn read() -> Result<Self, MonitorError> {
        Self::read_from(Path::new(MEMINFO_PATH))
    }

    /// Reads memory information from a specific file (for testing).
    pub(crate) fn read_from(path: &Path) -> Result<Self, MonitorError> {
        let content = read_proc_file(path)?;
        Self::parse(&content, path)
    }

    /// Parses the content of a `/proc/meminfo`-formatted string.
    pub(crate) fn parse(content: &str, source_path: &Path) -> Result<Self, MonitorError> {
        let total_bytes = require_kb_field(content, "MemTotal:", source_path)?;
        let available_bytes = require_kb_field(content, "MemAvailable:", source_path)?;
        let free_bytes = require_kb_field(content, "MemFree:", source_path)?;
        let used_bytes = total_bytes.saturating_sub(available_bytes);

        Ok(Self {
            total_bytes,
            available_bytes,
            free_bytes,
            used_bytes,
        })
    }

    /// Returns the memory utilisation as a fraction in `[0.0, 1.0]`.
    pub fn utilisation(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 / self.total_bytes as f64
    }

    /// Returns available memory in megabytes.
    pub fn available_mb(&self) -> u64 {
        self.available_bytes / MEGA
    }

    /// Returns total memory in megabytes.
    pub fn total_mb(&self) -> u64 {
        self.total_bytes / MEGA
    }

    /// Returns used memory in megabytes.
    pub fn used_mb(&self) -> u64 {
        self.used_bytes / MEGA
    }

    /// Returns free memory in megabytes.
    pub fn free_mb(&self) -> u64 {
        self.free_bytes / MEGA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_MEMINFO: &str = "\
MemTotal:        3884292 kB
MemFree:          218456 kB
MemAvailable:    2456780 kB
Buffers:          123456 kB
Cached:          1987654 kB
SwapCached:            0 kB
";

    #[test]
    fn test_parse_meminfo() {
        let info = MemoryInfo::parse(SAMPLE_MEMINFO, Path::new("/proc/meminfo")).unwrap();
        assert_eq!(info.total_bytes, 3884292 * 1024);
        assert_eq!(info.available_bytes, 2456780 * 1024);
        assert_eq!(info.free_bytes, 218456 * 1024);
        assert_eq!(info.used_bytes, (3884292 - 2456780) * 1024);
    }

    #[test]
    fn test_megabytes_are_decimal() {
        let info = MemoryInfo::parse(SAMPLE_MEMINFO, Path::new("/proc/meminfo")).unwrap();
        // 3884292 kB * 1024 = 3977515008 bytes ≈ 3977 MB
        assert_eq!(info.total_mb(), 3977);
        assert_eq!(info.free_mb(), 223);
    }

    #[test]
    fn test_utilisation() {
        let info = MemoryInfo {
            total_bytes: 4_000_000_000,
            available_bytes: 1_000_000_000,
            free_bytes: 500_000_000,
            used_bytes: 3_000_000_000,
        };
        assert!((info.utilisation() - 0.75).abs() < 0.001);
        assert_eq!(info.used_mb(), 3000);
    }

    #[test]
    fn test_utilisation_zero_total() {
        let info = MemoryInfo {
            total_bytes: 0,
            available_bytes: 0,
            free_bytes: 0,
            used_bytes: 0,
        };
        assert!((info.utilisation() - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meminfo");
        std::fs::write(&path, SAMPLE_MEMINFO).unwrap();
        let info = MemoryInfo::read_from(&path).unwrap();
        assert_eq!(info.total_bytes, 3884292 * 1024);
    }

    #[test]
    fn test_missing_mem_available() {
        let incomplete = "MemTotal:        3884292 kB\nMemFree:          218456 kB\n";
        let result = MemoryInfo::parse(incomplete, Path::new("/proc/meminfo"));
        assert!(matches!(result, Err(MonitorError::ParseError { .. })));
    }

    #[test]
    fn test_read_real_meminfo() {
        if Path::new(MEMINFO_PATH).exists() {
            let info = MemoryInfo::read().unwrap();
            assert!(info.total_bytes > 0);
            assert!(info.available_bytes <= info.total_bytes);
        }
    }
}
