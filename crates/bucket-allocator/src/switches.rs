// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Mapping from bucket names to JVM command-line switches.
//!
//! A [`SwitchTable`] lists, in output order, which switches each bucket
//! produces. Buckets without an entry (`native`, for instance) are sized
//! but never rendered.

use memory_model::Size;

/// One bucket's switches: each prefix is followed by the rendered size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchEntry {
    pub bucket: &'static str,
    pub prefixes: &'static [&'static str],
}

/// An ordered set of [`SwitchEntry`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchTable {
    entries: &'static [SwitchEntry],
}

/// Switches that set maximum sizes.
pub const MAXIMUM_SWITCHES: SwitchTable = SwitchTable {
    entries: &[
        SwitchEntry { bucket: "heap", prefixes: &["-Xmx"] },
        SwitchEntry { bucket: "young-generation", prefixes: &["-Xmn"] },
        SwitchEntry { bucket: "stack", prefixes: &["-Xss"] },
        SwitchEntry { bucket: "metaspace", prefixes: &["-XX:MaxMetaspaceSize="] },
        SwitchEntry { bucket: "permgen", prefixes: &["-XX:MaxPermSize="] },
        SwitchEntry { bucket: "code-cache", prefixes: &["-XX:ReservedCodeCacheSize="] },
        SwitchEntry { bucket: "direct-memory", prefixes: &["-XX:MaxDirectMemorySize="] },
        SwitchEntry {
            bucket: "compressed-class-space",
            prefixes: &["-XX:CompressedClassSpaceSize="],
        },
    ],
};

/// Switches that set initial sizes.
pub const INITIAL_SWITCHES: SwitchTable = SwitchTable {
    entries: &[
        SwitchEntry { bucket: "heap", prefixes: &["-Xms"] },
        SwitchEntry { bucket: "metaspace", prefixes: &["-XX:MetaspaceSize="] },
        SwitchEntry { bucket: "permgen", prefixes: &["-XX:PermSize="] },
    ],
};

/// Maximum and initial switches together, as the JRE accepts them.
pub const ALL_JRE_SWITCHES: SwitchTable = SwitchTable {
    entries: &[
        SwitchEntry { bucket: "heap", prefixes: &["-Xmx", "-Xms"] },
        SwitchEntry { bucket: "young-generation", prefixes: &["-Xmn"] },
        SwitchEntry { bucket: "stack", prefixes: &["-Xss"] },
        SwitchEntry {
            bucket: "metaspace",
            prefixes: &["-XX:MaxMetaspaceSize=", "-XX:MetaspaceSize="],
        },
        SwitchEntry {
            bucket: "permgen",
            prefixes: &["-XX:MaxPermSize=", "-XX:PermSize="],
        },
        SwitchEntry { bucket: "code-cache", prefixes: &["-XX:ReservedCodeCacheSize="] },
        SwitchEntry { bucket: "direct-memory", prefixes: &["-XX:MaxDirectMemorySize="] },
        SwitchEntry {
            bucket: "compressed-class-space",
            prefixes: &["-XX:CompressedClassSpaceSize="],
        },
    ],
};

impl SwitchTable {
    /// Iterates the entries in output order.
    pub fn entries(&self) -> impl Iterator<Item = &SwitchEntry> {
        self.entries.iter()
    }

    /// Returns the entry for `bucket`.
    pub fn entry(&self, bucket: &str) -> Option<&SwitchEntry> {
        self.entries.iter().find(|e| e.bucket == bucket)
    }

    /// Renders the switches for `bucket` at `size`; empty for unknown buckets.
    pub fn apply(&self, bucket: &str, size: Size) -> Vec<String> {
        self.entry(bucket)
            .map(|e| e.prefixes.iter().map(|p| format!("{p}{size}")).collect())
            .unwrap_or_default()
    }

    /// Finds the bucket whose prefix starts `switch`, returning it with the
    /// value text after the prefix.
    ///
    /// The longest matching prefix wins so that `-XX:MaxMetaspaceSize=`
    /// is never confused with a shorter one.
    pub fn match_switch<'a>(&self, switch: &'a str) -> Option<(&'static str, &'a str)> {
        self.entries
            .iter()
            .flat_map(|e| e.prefixes.iter().map(move |p| (e.bucket, *p)))
            .filter(|(_, p)| switch.starts_with(p))
            .max_by_key(|(_, p)| p.len())
            .map(|(bucket, p)| (bucket, &switch[p.len()..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        assert_eq!(MAXIMUM_SWITCHES.apply("heap", Size::from_mb(512)), vec!["-Xmx512M"]);
        assert_eq!(
            ALL_JRE_SWITCHES.apply("permgen", Size::from_mb(10)),
            vec!["-XX:MaxPermSize=10M", "-XX:PermSize=10M"]
        );
        assert!(MAXIMUM_SWITCHES.apply("native", Size::from_mb(10)).is_empty());
    }

    #[test]
    fn test_entry() {
        assert_eq!(MAXIMUM_SWITCHES.entry("young-generation").map(|e| e.prefixes), Some(&["-Xmn"][..]));
        assert!(MAXIMUM_SWITCHES.entry("native").is_none());
        assert!(INITIAL_SWITCHES.entry("stack").is_none());
    }

    #[test]
    fn test_match_switch() {
        assert_eq!(MAXIMUM_SWITCHES.match_switch("-Xmx1g"), Some(("heap", "1g")));
        assert_eq!(MAXIMUM_SWITCHES.match_switch("-Xmn256m"), Some(("young-generation", "256m")));
        assert_eq!(
            MAXIMUM_SWITCHES.match_switch("-XX:MaxMetaspaceSize=64M"),
            Some(("metaspace", "64M"))
        );
        assert_eq!(INITIAL_SWITCHES.match_switch("-XX:MetaspaceSize=20m"), Some(("metaspace", "20m")));
        assert_eq!(MAXIMUM_SWITCHES.match_switch("-Xms1g"), None);
        assert_eq!(MAXIMUM_SWITCHES.match_switch("-verbose:gc"), None);
    }

    #[test]
    fn test_maximum_order() {
        let names: Vec<&str> = MAXIMUM_SWITCHES.entries().map(|e| e.bucket).collect();
        assert_eq!(&names[..4], &["heap", "young-generation", "stack", "metaspace"]);
    }
}
