// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Calculator configuration loaded from TOML files or built from CLI flags.
//!
//! # TOML Format
//! ```toml
//! total_memory = "1G"
//! thread_count = 250
//! loaded_class_count = 12000
//! jvm_options = "-Xss256K -XX:+UseG1GC"
//! head_room = 5.0
//! jre_version = "1.8.0"
//! fixed_defaults = true
//! heap_young_generation_ratio = 0.3
//! direct_memory_to_heap_ratio = 0.1
//!
//! [weights]
//! heap = 75.0
//! metaspace = 10.0
//! stack = 5.0
//! native = 10.0
//!
//! [sizes]
//! heap = "256M.."
//!
//! [initials]
//! heap = "50%"
//! ```
//!
//! The CLI accepts the three tables as clause lists instead, e.g.
//! `--memory-weights heap:75,native:10`.

use crate::version::JreVersion;
use crate::CalculatorError;
use memory_model::{Range, Size};
use std::collections::BTreeMap;
use std::path::Path;

/// Everything the calculator needs to produce switches.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Total memory available to the JVM (human-readable, e.g. `"1G"`).
    pub total_memory: Option<String>,
    /// Read the total from the container's cgroup limit instead.
    pub detect_memory_limits: bool,
    /// Threads the stack must cover; `0` estimates from the stack's share.
    pub thread_count: usize,
    /// Classes expected to be loaded; sets a floor on class metadata.
    pub loaded_class_count: Option<u64>,
    /// JVM options already in effect (typically `JAVA_OPTS`).
    pub jvm_options: String,
    /// Percentage of the total left unallocated, in `[0, 100)`.
    pub head_room: f64,
    /// JRE version, which decides between permgen and metaspace.
    pub jre_version: String,
    /// Reserve the default code cache, direct memory and stack sizes for
    /// regions that are neither weighted nor set in the JVM options.
    pub fixed_defaults: bool,
    /// Fraction of the heap given to the young generation (`-Xmn`),
    /// in `(0, 1)`.
    pub heap_young_generation_ratio: Option<f64>,
    /// Fraction of the heap share given to direct memory instead, in
    /// `(0, 1)`.
    pub direct_memory_to_heap_ratio: Option<f64>,
    /// Bucket weights; empty means the defaults for the memory model.
    pub weights: BTreeMap<String, f64>,
    /// Bucket size ranges, e.g. `heap = "64m..1g"`.
    pub sizes: BTreeMap<String, String>,
    /// Initial sizes as percentages of the maximum, e.g. `heap = "50%"`.
    pub initials: BTreeMap<String, String>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            total_memory: None,
            detect_memory_limits: false,
            thread_count: 0,
            loaded_class_count: None,
            jvm_options: String::new(),
            head_room: 0.0,
            jre_version: "1.8".to_string(),
            fixed_defaults: true,
            heap_young_generation_ratio: None,
            direct_memory_to_heap_ratio: None,
            weights: BTreeMap::new(),
            sizes: BTreeMap::new(),
            initials: BTreeMap::new(),
        }
    }
}

impl CalculatorConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CalculatorError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CalculatorError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, CalculatorError> {
        toml::from_str(toml_str)
            .map_err(|e| CalculatorError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, CalculatorError> {
        toml::to_string_pretty(self)
            .map_err(|e| CalculatorError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Checks every field without touching the host.
    pub fn validate(&self) -> Result<(), CalculatorError> {
        match (&self.total_memory, self.detect_memory_limits) {
            (Some(_), true) => {
                return Err(CalculatorError::ConfigError(
                    "total memory and memory limit detection are mutually exclusive".into(),
                ))
            }
            (None, false) => {
                return Err(CalculatorError::ConfigError(
                    "either a total memory or memory limit detection is required".into(),
                ))
            }
            _ => {}
        }
        self.parse_total()?;

        if !(0.0..100.0).contains(&self.head_room) {
            return Err(CalculatorError::ConfigError(format!(
                "head room ({}) must be a percentage in [0, 100)",
                self.head_room
            )));
        }

        for (name, ratio) in [
            ("heap young generation ratio", self.heap_young_generation_ratio),
            ("direct memory to heap ratio", self.direct_memory_to_heap_ratio),
        ] {
            if let Some(r) = ratio {
                if !(r > 0.0 && r < 1.0) {
                    return Err(CalculatorError::ConfigError(format!(
                        "{name} ({r}) must be between 0 and 1, exclusive"
                    )));
                }
            }
        }

        if let Some((name, weight)) = self
            .weights
            .iter()
            .find(|(_, w)| !(w.is_finite() && **w > 0.0))
        {
            return Err(CalculatorError::ConfigError(format!(
                "weight ({weight}) for bucket {name} must be positive"
            )));
        }

        self.jre()?;
        self.size_ranges()?;
        self.initial_fractions()?;
        Ok(())
    }

    /// Parses the configured total memory, if any.
    pub fn parse_total(&self) -> Result<Option<Size>, CalculatorError> {
        let Some(raw) = &self.total_memory else {
            return Ok(None);
        };
        let total = Size::parse(raw)?;
        if total < bucket_allocator::MIN_TOTAL_MEMORY {
            return Err(CalculatorError::ConfigError(format!(
                "total memory ({raw}) must be at least 1K"
            )));
        }
        Ok(Some(total))
    }

    pub fn jre(&self) -> Result<JreVersion, CalculatorError> {
        JreVersion::parse(&self.jre_version)
    }

    /// Parses the configured size constraints.
    pub fn size_ranges(&self) -> Result<BTreeMap<String, Range>, CalculatorError> {
        self.sizes
            .iter()
            .map(|(name, raw)| Ok((name.trim().to_string(), Range::parse(raw)?)))
            .collect()
    }

    /// Parses the configured initial percentages into fractions.
    pub fn initial_fractions(&self) -> Result<BTreeMap<String, f64>, CalculatorError> {
        self.initials
            .iter()
            .map(|(name, raw)| Ok((name.trim().to_string(), parse_percentage(raw)?)))
            .collect()
    }
}

/// Splits `name:value,name:value` into a map; later names override earlier.
pub fn parse_clauses(s: &str) -> Result<BTreeMap<String, String>, CalculatorError> {
    let mut out = BTreeMap::new();
    for clause in s.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let (name, value) = clause.split_once(':').ok_or_else(|| {
            CalculatorError::ConfigError(format!("clause '{clause}' is not of the form name:value"))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CalculatorError::ConfigError(format!(
                "clause '{clause}' has an empty name"
            )));
        }
        out.insert(name.to_string(), value.trim().to_string());
    }
    Ok(out)
}

/// Parses `name:weight,...` clauses.
pub fn parse_weights(s: &str) -> Result<BTreeMap<String, f64>, CalculatorError> {
    parse_clauses(s)?
        .into_iter()
        .map(|(name, value)| {
            let weight = value.parse::<f64>().map_err(|_| {
                CalculatorError::ConfigError(format!("weight '{value}' for {name} is not a number"))
            })?;
            Ok((name, weight))
        })
        .collect()
}

/// Parses `"50%"` (or `"50"`) into `0.5`.
pub fn parse_percentage(s: &str) -> Result<f64, CalculatorError> {
    let t = s.trim();
    let digits = t.strip_suffix('%').unwrap_or(t).trim();
    let invalid = || CalculatorError::ConfigError(format!("'{s}' is not a percentage in [0%, 100%]"));
    let pct = digits.parse::<f64>().map_err(|_| invalid())?;
    if !(0.0..=100.0).contains(&pct) {
        return Err(invalid());
    }
    Ok(pct / 100.0)
}
