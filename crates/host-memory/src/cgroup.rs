// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Container memory limits from the cgroup filesystem.
//!
//! cgroup v2 exposes a single `memory.max` file holding either a byte count
//! or the literal `max`. cgroup v1 exposes `memory.limit_in_bytes`, where
//! "no limit" is reported as a huge page-aligned number close to
//! `i64::MAX`.

use crate::DetectError;
use memory_model::Size;
use std::io::ErrorKind;
use std::path::Path;

/// Default cgroup v2 limit file.
pub const CGROUP_V2_PATH: &str = "/sys/fs/cgroup/memory.max";

/// Default cgroup v1 limit file.
pub const CGROUP_V1_PATH: &str = "/sys/fs/cgroup/memory/memory.limit_in_bytes";

/// What cgroup v1 reports when no limit is set (`i64::MAX` page-aligned).
pub const CGROUP_V1_UNLIMITED: i64 = 9_223_372_036_854_771_712;

/// v1 values at or above this are treated as unlimited.
const UNLIMITED_THRESHOLD: i64 = 1 << 62;

/// The state of one cgroup limit file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgroupLimit {
    /// The file does not exist (not running under this cgroup version).
    Absent,
    /// The file exists but no limit is set.
    Unlimited,
    /// A limit is set.
    Limited(Size),
}

/// Reads a cgroup v2 `memory.max` file.
pub fn read_v2_from(path: &Path) -> Result<CgroupLimit, DetectError> {
    match read_optional(path)? {
        Some(content) => parse_v2(&content, path),
        None => Ok(CgroupLimit::Absent),
    }
}

/// Reads a cgroup v1 `memory.limit_in_bytes` file.
pub fn read_v1_from(path: &Path) -> Result<CgroupLimit, DetectError> {
    match read_optional(path)? {
        Some(content) => parse_v1(&content, path),
        None => Ok(CgroupLimit::Absent),
    }
}

pub(crate) fn parse_v2(content: &str, path: &Path) -> Result<CgroupLimit, DetectError> {
    let value = content.trim();
    if value == "max" {
        return Ok(CgroupLimit::Unlimited);
    }
    parse_bytes(value, path).map(CgroupLimit::Limited)
}

pub(crate) fn parse_v1(content: &str, path: &Path) -> Result<CgroupLimit, DetectError> {
    let bytes = parse_bytes(content.trim(), path)?;
    if bytes.bytes() >= UNLIMITED_THRESHOLD {
        Ok(CgroupLimit::Unlimited)
    } else {
        Ok(CgroupLimit::Limited(bytes))
    }
}

fn parse_bytes(value: &str, path: &Path) -> Result<Size, DetectError> {
    value
        .parse::<i64>()
        .ok()
        .filter(|b| *b >= 0)
        .map(Size::from_bytes)
        .ok_or_else(|| DetectError::ParseError {
            path: path.display().to_string(),
            detail: format!("expected a byte count, got '{value}'"),
        })
}

/// Reads `path`, mapping "not found" to `None`.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>, DetectError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DetectError::ReadError {
            path: path.display().to_string(),
            source: e,
        }),
    }
}
