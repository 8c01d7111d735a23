// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Initial-size switches derived from balanced maximum sizes.
//!
//! An initial is a fraction of the bucket's maximum (`-Xms` as a share of
//! `-Xmx`, for example). The JVM refuses initial sizes below a per-bucket
//! minimum, so those are raised to the minimum with a warning, unless
//! the maximum itself is below it.

use crate::switches::SwitchTable;
use memory_model::Size;
use std::collections::BTreeMap;

/// Smallest initial size the JVM accepts for `bucket`.
pub fn initial_minimum(bucket: &str) -> Size {
    match bucket {
        "heap" => Size::from_mb(2),
        "metaspace" => Size::from_kb(256),
        "permgen" => Size::from_mb(1),
        _ => Size::ZERO,
    }
}

/// Initial switches and the warnings raised while computing them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialSwitches {
    pub switches: Vec<String>,
    pub warnings: Vec<String>,
}

/// Computes initial switches for every bucket that has both an initial
/// fraction and a balanced size, in `table` order.
pub fn initial_switches(
    initials: &BTreeMap<String, f64>,
    sizes: &BTreeMap<String, Size>,
    table: &SwitchTable,
) -> InitialSwitches {
    let mut out = InitialSwitches::default();

    for entry in table.entries() {
        let (Some(&fraction), Some(&size)) = (initials.get(entry.bucket), sizes.get(entry.bucket))
        else {
            continue;
        };

        let mut initial = size.scale(fraction);
        let min = initial_minimum(entry.bucket);
        if initial < min {
            if size < min {
                // Not enough maximum to reach the minimum; keep the maximum.
                initial = size;
            } else {
                out.warnings.push(format!(
                    "The configured initial memory size {initial} for {} is less than the JVM \
                     minimum {min}. Setting initial value to {min}.",
                    entry.bucket
                ));
                initial = min;
            }
        }
        out.switches.extend(table.apply(entry.bucket, initial));
    }

    out
}
