// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Advisory checks run on a successfully balanced allocation.
//!
//! None of these stop the calculation. They point an operator at
//! configurations that are probably not what they meant: too much native
//! memory left over, a budget the buckets do not come close to using, or
//! an explicit size that is so close to the computed one it could be
//! dropped.

use crate::bucket::{Bucket, NATIVE, STACK};
use memory_model::{Range, Size};
use std::collections::BTreeMap;
use std::fmt;

/// Native memory above this multiple of its proportional share is flagged.
pub const NATIVE_SLACK_FACTOR: f64 = 3.0;

/// Allocations summing to less than this fraction of the total are flagged.
pub const MIN_UTILISATION: f64 = 0.8;

/// Pinned values within this fraction of their share are flagged.
pub const CLOSE_TO_DEFAULT: f64 = 0.1;

/// A non-fatal observation about a balanced allocation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AllocationWarning {
    /// `native` received far more than its weight would give it.
    SpareNativeMemory { size: Size, share: Size },

    /// The buckets use too little of the budget.
    Underutilised { allocated: Size, total: Size },

    /// An exact size was given that is close to what would be computed.
    CloseToDefault {
        bucket: String,
        value: Size,
        computed: Size,
    },
}

impl fmt::Display for AllocationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpareNativeMemory { size, share } => write!(
                f,
                "There is more than {NATIVE_SLACK_FACTOR} times more spare native memory ({size}) \
                 than the default ({share}) so configured Java memory may be too small \
                 or available memory may be too large"
            ),
            Self::Underutilised { allocated, total } => write!(
                f,
                "The allocated Java memory sizes total {allocated} which is less than \
                 {MIN_UTILISATION} of the available memory {total}, so configured Java memory \
                 sizes may be too small or available memory may be too large"
            ),
            Self::CloseToDefault {
                bucket,
                value,
                computed,
            } => write!(
                f,
                "The specified value {value} for memory type {bucket} is close to the computed \
                 value {computed}. Consider taking the default."
            ),
        }
    }
}

/// The size `bucket` would get if the whole `total` were shared by weight.
pub(crate) fn proportional_share(total: Size, bucket: &Bucket, total_weight: f64) -> Size {
    total.scale(bucket.weight() / total_weight)
}

/// Runs every check against balanced (still stack-normalized) buckets.
pub(crate) fn check(
    total: Size,
    total_weight: f64,
    buckets: &BTreeMap<String, Bucket>,
    original_sizes: &BTreeMap<String, Range>,
) -> Vec<AllocationWarning> {
    let mut warnings = Vec::new();

    if let Some(native) = buckets.get(NATIVE) {
        let caller_floor = original_sizes
            .get(NATIVE)
            .is_some_and(|r| !r.floor().is_zero());
        if !caller_floor {
            let share = proportional_share(total, native, total_weight);
            let size = native.size().unwrap_or(Size::ZERO);
            if size.divided_by(&share) > NATIVE_SLACK_FACTOR {
                warnings.push(AllocationWarning::SpareNativeMemory { size, share });
            }
        }
    }

    let allocated: Size = buckets.values().filter_map(Bucket::size).sum();
    if allocated.divided_by(&total) < MIN_UTILISATION {
        warnings.push(AllocationWarning::Underutilised { allocated, total });
    }

    for (name, range) in original_sizes {
        if name == STACK || !range.is_degenerate() {
            continue;
        }
        let Some(bucket) = buckets.get(name) else {
            continue;
        };
        let computed = proportional_share(total, bucket, total_weight);
        let value = range.floor();
        let distance = (value.bytes() - computed.bytes()).abs() as f64;
        if distance <= computed.bytes() as f64 * CLOSE_TO_DEFAULT {
            warnings.push(AllocationWarning::CloseToDefault {
                bucket: name.clone(),
                value,
                computed,
            });
        }
    }

    for w in &warnings {
        tracing::warn!("{w}");
    }
    warnings
}
