// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JRE versions and the class-metadata memory model they imply.
//!
//! JREs before 1.8 keep class metadata in the permanent generation
//! (`-XX:MaxPermSize=`); 1.8 and later use metaspace
//! (`-XX:MaxMetaspaceSize=`).

use crate::CalculatorError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A `major.minor.micro` JRE version. Missing components are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JreVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl JreVersion {
    /// The first version with metaspace.
    pub const METASPACE_SINCE: JreVersion = JreVersion::new(1, 8, 0);

    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self { major, minor, micro }
    }

    /// Parses `"1"`, `"1.8"` or `"1.8.0"`.
    pub fn parse(s: &str) -> Result<Self, CalculatorError> {
        let invalid = || CalculatorError::InvalidVersion(s.to_string());
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() > 3 {
            return Err(invalid());
        }

        let mut v = [0u32; 3];
        for (slot, part) in v.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }
        Ok(Self::new(v[0], v[1], v[2]))
    }

    pub fn memory_model(&self) -> MemoryModel {
        MemoryModel::for_version(*self)
    }
}

impl FromStr for JreVersion {
    type Err = CalculatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JreVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

/// Where the JVM keeps class metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryModel {
    PermGen,
    Metaspace,
}

impl MemoryModel {
    pub fn for_version(version: JreVersion) -> Self {
        if version < JreVersion::METASPACE_SINCE {
            Self::PermGen
        } else {
            Self::Metaspace
        }
    }

    /// The bucket that holds class metadata.
    pub fn class_bucket(&self) -> &'static str {
        match self {
            Self::PermGen => "permgen",
            Self::Metaspace => "metaspace",
        }
    }

    /// Default weights: `heap:75, <class bucket>:10, stack:5, native:10`.
    pub fn default_weights(&self) -> BTreeMap<String, f64> {
        [
            ("heap", 75.0),
            (self.class_bucket(), 10.0),
            ("stack", 5.0),
            ("native", 10.0),
        ]
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect()
    }
}

impl fmt::Display for MemoryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_bucket())
    }
}
