// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shared helpers for `key:   value kB` style procfs files.

use crate::MonitorError;
use std::path::Path;

/// Reads a procfs file into a string.
pub(crate) fn read_proc_file(path: &Path) -> Result<String, MonitorError> {
    if !path.exists() {
        return Err(MonitorError::NotAvailable {
            path: path.display().to_string(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| MonitorError::ReadError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Finds `key` (including its trailing colon) and returns its value in bytes.
///
/// Values are reported by the kernel in kB. Returns `Ok(None)` if the key
/// is absent.
pub(crate) fn find_kb_field(
    content: &str,
    key: &str,
    source_path: &Path,
) -> Result<Option<u64>, MonitorError> {
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() != Some(key) {
            continue;
        }
        let Some(value) = parts.next() else {
            return Err(MonitorError::ParseError {
                path: source_path.display().to_string(),
                detail: format!("{key} has no value"),
            });
        };
        return parse_kb_value(value, source_path).map(|kb| Some(kb * 1024));
    }
    Ok(None)
}

/// Like [`find_kb_field`], but a missing key is a parse error.
pub(crate) fn require_kb_field(
    content: &str,
    key: &str,
    source_path: &Path,
) -> Result<u64, MonitorError> {
    find_kb_field(content, key, source_path)?.ok_or_else(|| MonitorError::ParseError {
        path: source_path.display().to_string(),
        detail: format!("{} not found", key.trim_end_matches(':')),
    })
}

/// Parses a numeric kB value.
fn parse_kb_value(s: &str, source_path: &Path) -> Result<u64, MonitorError> {
    s.parse::<u64>().map_err(|_| MonitorError::ParseError {
        path: source_path.display().to_string(),
        detail: format!("expected integer kB value, got '{s}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Name:\tcat\nVmRSS:\t    2048 kB\nBroken:\n";

    #[test]
    fn test_find_kb_field() {
        let p = Path::new("/proc/self/status");
        assert_eq!(find_kb_field(SAMPLE, "VmRSS:", p).unwrap(), Some(2048 * 1024));
        assert_eq!(find_kb_field(SAMPLE, "VmHWM:", p).unwrap(), None);
    }

    #[test]
    fn test_key_without_value() {
        let p = Path::new("/proc/self/status");
        let result = find_kb_field(SAMPLE, "Broken:", p);
        assert!(matches!(result, Err(MonitorError::ParseError { .. })));
    }

    #[test]
    fn test_require_missing() {
        let p = Path::new("/proc/meminfo");
        let result = require_kb_field(SAMPLE, "MemTotal:", p);
        match result {
            Err(MonitorError::ParseError { detail, .. }) => assert_eq!(detail, "MemTotal not found"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_proc_file(Path::new("/nonexistent/proc/status"));
        assert!(matches!(result, Err(MonitorError::NotAvailable { .. })));
    }
}
