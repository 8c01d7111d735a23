// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # host-memory
//!
//! Detects how much memory a JVM in this process's container may use.
//!
//! Probe order for [`detect_memory_limit`]:
//!
//! | Source | File | "No limit" marker |
//! |---|---|---|
//! | cgroup v2 | `/sys/fs/cgroup/memory.max` | `max` |
//! | cgroup v1 | `/sys/fs/cgroup/memory/memory.limit_in_bytes` | ≥ 2^62 |
//!
//! [`detect_host_memory`] reads `MemTotal` from `/proc/meminfo` and is only
//! used when the caller asks for it.

pub mod cgroup;
mod error;
pub mod meminfo;

pub use cgroup::CgroupLimit;
pub use error::DetectError;

use memory_model::Size;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a detected size came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemorySource {
    CgroupV2,
    CgroupV1,
    MemInfo,
}

impl fmt::Display for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CgroupV2 => write!(f, "cgroup v2"),
            Self::CgroupV1 => write!(f, "cgroup v1"),
            Self::MemInfo => write!(f, "/proc/meminfo"),
        }
    }
}

/// A detected memory size and its source.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DetectedMemory {
    pub size: Size,
    pub source: MemorySource,
    pub path: String,
}

impl fmt::Display for DetectedMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} via {})", self.size, self.source, self.path)
    }
}

type ReadLimit = fn(&Path) -> Result<CgroupLimit, DetectError>;

/// The files probed during detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbePaths {
    pub cgroup_v2: PathBuf,
    pub cgroup_v1: PathBuf,
    pub meminfo: PathBuf,
}

impl Default for ProbePaths {
    fn default() -> Self {
        Self {
            cgroup_v2: PathBuf::from(cgroup::CGROUP_V2_PATH),
            cgroup_v1: PathBuf::from(cgroup::CGROUP_V1_PATH),
            meminfo: PathBuf::from(meminfo::MEMINFO_PATH),
        }
    }
}

impl ProbePaths {
    /// Finds the container memory limit, trying cgroup v2 then v1.
    pub fn memory_limit(&self) -> Result<DetectedMemory, DetectError> {
        let probes = [
            (MemorySource::CgroupV2, self.cgroup_v2.as_path(), cgroup::read_v2_from as ReadLimit),
            (MemorySource::CgroupV1, self.cgroup_v1.as_path(), cgroup::read_v1_from as ReadLimit),
        ];

        for (source, path, read) in probes {
            match read(path)? {
                CgroupLimit::Limited(size) => {
                    tracing::info!("detected memory limit {size} from {source} ({})", path.display());
                    return Ok(DetectedMemory {
                        size,
                        source,
                        path: path.display().to_string(),
                    });
                }
                CgroupLimit::Unlimited => {
                    tracing::debug!("{source} reports no memory limit at {}", path.display());
                }
                CgroupLimit::Absent => {
                    tracing::debug!("{source} limit file {} not present", path.display());
                }
            }
        }

        Err(DetectError::NotAvailable {
            tried: format!("{} and {}", self.cgroup_v2.display(), self.cgroup_v1.display()),
        })
    }

    /// Reads total physical memory.
    pub fn host_memory(&self) -> Result<DetectedMemory, DetectError> {
        let size = meminfo::read_mem_total_from(&self.meminfo)?;
        tracing::info!("host memory {size} from {}", self.meminfo.display());
        Ok(DetectedMemory {
            size,
            source: MemorySource::MemInfo,
            path: self.meminfo.display().to_string(),
        })
    }
}

/// Finds the container memory limit from the standard cgroup files.
pub fn detect_memory_limit() -> Result<DetectedMemory, DetectError> {
    ProbePaths::default().memory_limit()
}

/// Reads total physical memory from `/proc/meminfo`.
pub fn detect_host_memory() -> Result<DetectedMemory, DetectError> {
    ProbePaths::default().host_memory()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        dir: PathBuf,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("memcalc-{name}-{}", std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            Self { dir }
        }

        fn write(&self, file: &str, content: &str) -> PathBuf {
            let path = self.dir.join(file);
            std::fs::write(&path, content).unwrap();
            path
        }

        fn missing(&self, file: &str) -> PathBuf {
            self.dir.join(file)
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    #[test]
    fn test_v2_preferred() {
        let fx = Fixture::new("v2");
        let paths = ProbePaths {
            cgroup_v2: fx.write("memory.max", "1073741824\n"),
            cgroup_v1: fx.write("memory.limit_in_bytes", "536870912\n"),
            meminfo: fx.missing("meminfo"),
        };
        let detected = paths.memory_limit().unwrap();
        assert_eq!(detected.size, Size::from_gb(1));
        assert_eq!(detected.source, MemorySource::CgroupV2);
    }

    #[test]
    fn test_falls_back_to_v1() {
        let fx = Fixture::new("v1");
        let paths = ProbePaths {
            cgroup_v2: fx.write("memory.max", "max\n"),
            cgroup_v1: fx.write("memory.limit_in_bytes", "536870912\n"),
            meminfo: fx.missing("meminfo"),
        };
        let detected = paths.memory_limit().unwrap();
        assert_eq!(detected.size, Size::from_mb(512));
        assert_eq!(detected.source, MemorySource::CgroupV1);
    }

    #[test]
    fn test_no_limit() {
        let fx = Fixture::new("none");
        let paths = ProbePaths {
            cgroup_v2: fx.missing("memory.max"),
            cgroup_v1: fx.write("memory.limit_in_bytes", "9223372036854771712\n"),
            meminfo: fx.missing("meminfo"),
        };
        let err = paths.memory_limit().unwrap_err();
        assert!(matches!(err, DetectError::NotAvailable { .. }));
        assert!(err.to_string().contains("memory.max"));
    }

    #[test]
    fn test_host_memory() {
        let fx = Fixture::new("meminfo");
        let paths = ProbePaths {
            cgroup_v2: fx.missing("memory.max"),
            cgroup_v1: fx.missing("memory.limit_in_bytes"),
            meminfo: fx.write("meminfo", "MemTotal:        2048 kB\n"),
        };
        let detected = paths.host_memory().unwrap();
        assert_eq!(detected.size, Size::from_mb(2));
        assert_eq!(detected.source, MemorySource::MemInfo);
        assert!(detected.to_string().starts_with("2M (/proc/meminfo via"));
    }
}
