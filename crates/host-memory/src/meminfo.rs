// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Physical memory from `/proc/meminfo`.

use crate::DetectError;
use memory_model::{Size, KIBI};
use std::path::Path;

/// Default path to the kernel memory info file.
pub const MEMINFO_PATH: &str = "/proc/meminfo";

/// Reads `MemTotal` from a `/proc/meminfo`-formatted file.
pub fn read_mem_total_from(path: &Path) -> Result<Size, DetectError> {
    let content = std::fs::read_to_string(path).map_err(|e| DetectError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_mem_total(&content, path)
}

/// Parses the `MemTotal:` line (values are in kB).
pub(crate) fn parse_mem_total(content: &str, source_path: &Path) -> Result<Size, DetectError> {
    let line = content
        .lines()
        .find(|l| l.starts_with("MemTotal:"))
        .ok_or_else(|| DetectError::ParseError {
            path: source_path.display().to_string(),
            detail: "MemTotal not found".to_string(),
        })?;

    let value = line.split_whitespace().nth(1).unwrap_or_default();
    value
        .parse::<i64>()
        .ok()
        .and_then(|kb| kb.checked_mul(KIBI))
        .map(Size::from_bytes)
        .ok_or_else(|| DetectError::ParseError {
            path: source_path.display().to_string(),
            detail: format!("expected integer kB value, got '{value}'"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_MEMINFO: &str = "\
MemTotal:        3884292 kB
MemFree:          218456 kB
MemAvailable:    2456780 kB
Buffers:          123456 kB
";

    #[test]
    fn test_parse_mem_total() {
        let total = parse_mem_total(SAMPLE_MEMINFO, Path::new(MEMINFO_PATH)).unwrap();
        assert_eq!(total, Size::from_kb(3884292));
        // 3884292 kB ≈ 3793 MB
        assert_eq!(total.megas(), 3793);
    }

    #[test]
    fn test_missing_mem_total() {
        let err = parse_mem_total("MemFree: 1 kB\n", Path::new(MEMINFO_PATH)).unwrap_err();
        assert!(err.to_string().contains("MemTotal not found"));
    }

    #[test]
    fn test_bad_value() {
        let err = parse_mem_total("MemTotal: lots kB\n", Path::new(MEMINFO_PATH)).unwrap_err();
        assert!(matches!(err, DetectError::ParseError { .. }));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_mem_total_from(Path::new("/nonexistent/meminfo")).unwrap_err();
        assert!(matches!(err, DetectError::ReadError { .. }));
    }
}
