// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory switches already present in the user's JVM options.
//!
//! Whatever the user set is taken as fixed: maximums become degenerate
//! ranges for their bucket and neither maximum nor initial switches are
//! emitted again for it.

use crate::CalculatorError;
use bucket_allocator::{INITIAL_SWITCHES, MAXIMUM_SWITCHES};
use memory_model::{Range, Size};
use std::collections::BTreeMap;
use std::fmt;

/// Memory switches found in a JVM options string, keyed by bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JvmOptions {
    maximums: BTreeMap<String, Size>,
    initials: BTreeMap<String, Size>,
}

impl JvmOptions {
    /// Scans whitespace-separated options; unrelated options are ignored.
    ///
    /// A later switch for the same bucket overrides an earlier one, as the
    /// JVM does.
    pub fn parse(raw: &str) -> Result<Self, CalculatorError> {
        let mut options = Self::default();

        for token in raw.split_whitespace() {
            let (target, bucket, value) = if let Some((bucket, value)) = MAXIMUM_SWITCHES.match_switch(token) {
                (&mut options.maximums, bucket, value)
            } else if let Some((bucket, value)) = INITIAL_SWITCHES.match_switch(token) {
                (&mut options.initials, bucket, value)
            } else {
                continue;
            };

            let size = Size::parse(value).map_err(|e| CalculatorError::InvalidOption {
                option: token.to_string(),
                source: e,
            })?;
            tracing::debug!("JVM option {token} fixes {bucket} at {size}");
            target.insert(bucket.to_string(), size);
        }

        Ok(options)
    }

    pub fn is_empty(&self) -> bool {
        self.maximums.is_empty() && self.initials.is_empty()
    }

    /// Maximum sizes set by the user.
    pub fn maximums(&self) -> &BTreeMap<String, Size> {
        &self.maximums
    }

    /// Initial sizes set by the user.
    pub fn initials(&self) -> &BTreeMap<String, Size> {
        &self.initials
    }

    pub fn has_maximum(&self, bucket: &str) -> bool {
        self.maximums.contains_key(bucket)
    }

    pub fn has_initial(&self, bucket: &str) -> bool {
        self.initials.contains_key(bucket)
    }

    /// The user's maximums as degenerate ranges.
    pub fn fixed_ranges(&self) -> BTreeMap<String, Range> {
        self.maximums
            .iter()
            .map(|(bucket, size)| (bucket.clone(), Range::exactly(*size)))
            .collect()
    }
}

impl fmt::Display for JvmOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let switches: Vec<String> = MAXIMUM_SWITCHES
            .entries()
            .filter_map(|e| self.maximums.get(e.bucket).map(|s| MAXIMUM_SWITCHES.apply(e.bucket, *s)))
            .chain(
                INITIAL_SWITCHES
                    .entries()
                    .filter_map(|e| self.initials.get(e.bucket).map(|s| INITIAL_SWITCHES.apply(e.bucket, *s))),
            )
            .flatten()
            .collect();
        f.write_str(&switches.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_switches() {
        let o = JvmOptions::parse(
            "-Xmx512m -Xmn128m -Xss256K -XX:MaxMetaspaceSize=64M -XX:ReservedCodeCacheSize=240M \
             -XX:MaxDirectMemorySize=10M -XX:CompressedClassSpaceSize=1G",
        )
        .unwrap();
        assert_eq!(o.maximums().get("heap"), Some(&Size::from_mb(512)));
        assert_eq!(o.maximums().get("young-generation"), Some(&Size::from_mb(128)));
        assert_eq!(o.maximums().get("stack"), Some(&Size::from_kb(256)));
        assert_eq!(o.maximums().get("metaspace"), Some(&Size::from_mb(64)));
        assert_eq!(o.maximums().get("code-cache"), Some(&Size::from_mb(240)));
        assert_eq!(o.maximums().get("direct-memory"), Some(&Size::from_mb(10)));
        assert_eq!(o.maximums().get("compressed-class-space"), Some(&Size::from_gb(1)));
        assert!(o.initials().is_empty());
    }

    #[test]
    fn test_parse_initial_switches() {
        let o = JvmOptions::parse("-Xms128m -XX:MetaspaceSize=20m -XX:PermSize=10m").unwrap();
        assert_eq!(o.initials().get("heap"), Some(&Size::from_mb(128)));
        assert_eq!(o.initials().get("metaspace"), Some(&Size::from_mb(20)));
        assert_eq!(o.initials().get("permgen"), Some(&Size::from_mb(10)));
        assert!(o.maximums().is_empty());
        assert!(o.has_initial("heap"));
        assert!(!o.has_maximum("heap"));
    }

    #[test]
    fn test_ignores_unrelated_options() {
        let o = JvmOptions::parse("-server -Dfoo=bar -XX:+UseG1GC -verbose:gc").unwrap();
        assert!(o.is_empty());
    }

    #[test]
    fn test_last_switch_wins() {
        let o = JvmOptions::parse("-Xmx1g -Xmx2g").unwrap();
        assert_eq!(o.maximums().get("heap"), Some(&Size::from_gb(2)));
    }

    #[test]
    fn test_invalid_size() {
        let err = JvmOptions::parse("-Xmx1x").unwrap_err();
        assert!(matches!(err, CalculatorError::InvalidOption { ref option, .. } if option == "-Xmx1x"));
        assert!(JvmOptions::parse("-XX:MaxMetaspaceSize=").is_err());
    }

    #[test]
    fn test_fixed_ranges() {
        let o = JvmOptions::parse("-Xmx1g -Xms512m").unwrap();
        let ranges = o.fixed_ranges();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges.get("heap"), Some(&Range::exactly(Size::from_gb(1))));
    }

    #[test]
    fn test_display() {
        let o = JvmOptions::parse("-Xms1g -XX:MaxPermSize=64m -Xmn512m -Xmx2g").unwrap();
        assert_eq!(o.to_string(), "-Xmx2G -Xmn512M -XX:MaxPermSize=64M -Xms1G");
    }
}
