// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The proportional, constraint-aware allocator.
//!
//! # Algorithm
//!
//! Balancing is weighted water-filling over the buckets:
//!
//! ```text
//! remaining = all buckets, budget = total
//! loop:
//!     W = Σ weight over remaining
//!     for b in remaining:  tentative(b) = budget × weight(b) / W
//!     pin every b whose tentative is outside its range to the nearest bound
//!     budget -= Σ pinned;  remaining -= pinned
//!     stop when nothing was pinned (fixed point) or remaining is empty
//! ```
//!
//! Buckets with tight ranges are settled first at their boundary and the
//! rest of the budget is shared out again among the others. Every pass
//! pins at least one bucket or ends the loop, so there are at most as many
//! passes as buckets.
//!
//! # Stack normalization
//!
//! `stack` is sized per thread while every other bucket is a whole-process
//! quantity. Before filling, the stack range is scaled by the number of
//! threads so it competes for memory as an aggregate; afterwards the
//! aggregate is divided back down to a per-thread size.

use crate::bucket::{Bucket, STACK};
use crate::switches::SwitchTable;
use crate::warnings::{self, AllocationWarning};
use crate::AllocatorError;
use memory_model::{Range, Size};
use std::collections::{BTreeMap, BTreeSet};

/// Smallest total memory that can be balanced.
pub const MIN_TOTAL_MEMORY: Size = Size::from_kb(1);

/// Divides a memory budget among weighted, range-constrained buckets.
///
/// # Lifecycle
/// Build once with [`Allocator::new`], call [`Allocator::balance`] once,
/// then read [`Allocator::switches`], [`Allocator::warnings`] and
/// [`Allocator::sizes`]. An allocator whose `balance` failed must be
/// discarded.
///
/// # Example
/// ```
/// use bucket_allocator::{Allocator, MAXIMUM_SWITCHES};
/// use memory_model::{Range, Size};
/// use std::collections::BTreeMap;
///
/// let sizes = BTreeMap::from([("heap".to_string(), Range::parse("0..").unwrap())]);
/// let weights = BTreeMap::from([
///     ("heap".to_string(), 1.0),
///     ("native".to_string(), 3.0),
/// ]);
///
/// let mut a = Allocator::new(sizes, weights).unwrap();
/// a.balance(Size::from_gb(4), 0).unwrap();
/// assert_eq!(a.switches(&MAXIMUM_SWITCHES), vec!["-Xmx1G"]);
/// ```
#[derive(Debug, Clone)]
pub struct Allocator {
    original_sizes: BTreeMap<String, Range>,
    buckets: BTreeMap<String, Bucket>,
    warnings: Vec<AllocationWarning>,
}

/// How the stack bucket was scaled before filling.
#[derive(Debug, Clone, Copy)]
struct StackNormalization {
    threads: f64,
    per_thread: Range,
}

impl Allocator {
    /// Creates an allocator with one bucket per weighted name.
    ///
    /// A bucket takes its range from `sizes`, or `0..` if none is given.
    /// A size constraint for a name without a weight is an error.
    pub fn new(
        sizes: BTreeMap<String, Range>,
        weights: BTreeMap<String, f64>,
    ) -> Result<Self, AllocatorError> {
        let original_sizes: BTreeMap<String, Range> = sizes
            .into_iter()
            .map(|(name, range)| (name.trim().to_string(), range))
            .collect();

        let mut buckets = BTreeMap::new();
        for (name, weight) in &weights {
            let range = original_sizes
                .get(name.trim())
                .copied()
                .unwrap_or_default();
            let bucket = Bucket::new(name, *weight, range)?;
            buckets.insert(bucket.name().to_string(), bucket);
        }

        if let Some((name, range)) = original_sizes
            .iter()
            .find(|(name, _)| !buckets.contains_key(name.as_str()))
        {
            return Err(AllocatorError::UnweightedBucket {
                bucket: name.clone(),
                range: range.to_string(),
            });
        }

        Ok(Self {
            original_sizes,
            buckets,
            warnings: Vec::new(),
        })
    }

    /// Assigns every bucket its lower bound, ignoring any memory limit.
    ///
    /// `stack` gets its default size so that it is never zero.
    pub fn set_lower_bounds(&mut self) {
        for bucket in self.buckets.values_mut() {
            let size = if bucket.is_stack() {
                bucket.default_size()
            } else {
                bucket.range().floor()
            };
            bucket.set_size(size);
        }
    }

    /// Balances `total_memory` across the buckets.
    ///
    /// `thread_count` is the number of threads the stack must cover; zero
    /// estimates it from the stack bucket's share of the budget.
    pub fn balance(&mut self, total_memory: Size, thread_count: usize) -> Result<(), AllocatorError> {
        if total_memory < MIN_TOTAL_MEMORY {
            return Err(AllocatorError::TotalTooSmall(total_memory.bytes()));
        }

        let total_weight: f64 = self.buckets.values().map(Bucket::weight).sum();
        let stack = self.normalize_stack(total_memory, thread_count, total_weight)?;

        self.fill(total_memory)
            .map_err(|e| self.allocation_error(e))?;

        if let Some(bucket) = self
            .buckets
            .values()
            .find(|b| b.size().map_or(true, |s| s.is_zero()))
        {
            return Err(self.allocation_error(AllocatorError::ZeroAllocation(
                bucket.name().to_string(),
            )));
        }

        self.warnings = warnings::check(
            total_memory,
            total_weight,
            &self.buckets,
            &self.original_sizes,
        );

        if let Some(stack) = stack {
            self.denormalize_stack(stack);
        }

        tracing::info!("{}", self.summary());
        Ok(())
    }

    /// Scales the stack range from per-thread to aggregate.
    fn normalize_stack(
        &mut self,
        total_memory: Size,
        thread_count: usize,
        total_weight: f64,
    ) -> Result<Option<StackNormalization>, AllocatorError> {
        let Some(stack) = self.buckets.get(STACK) else {
            return Ok(None);
        };

        let threads = if thread_count > 0 {
            thread_count as f64
        } else {
            let share = total_memory.bytes() as f64 * stack.weight() / total_weight;
            (share / stack.default_size().bytes() as f64).max(1.0)
        };

        let per_thread = stack.range();
        let aggregate = per_thread.scale(threads)?;
        tracing::debug!(
            "stack normalized for {threads:.1} threads: {per_thread} per thread, {aggregate} aggregate"
        );

        let normalized = stack.with_range(aggregate);
        self.buckets.insert(STACK.to_string(), normalized);
        Ok(Some(StackNormalization { threads, per_thread }))
    }

    /// Converts the aggregate stack size back to a per-thread size.
    fn denormalize_stack(&mut self, stack: StackNormalization) {
        let Some(bucket) = self.buckets.get(STACK) else {
            return;
        };
        let aggregate = bucket.size().unwrap_or(Size::ZERO);
        let per_thread = Size::from_bytes((aggregate.bytes() as f64 / stack.threads).round() as i64);

        let mut restored = bucket.with_range(stack.per_thread);
        restored.set_size(per_thread);
        self.buckets.insert(STACK.to_string(), restored);
    }

    /// The proportional-fill loop.
    fn fill(&mut self, total_memory: Size) -> Result<(), AllocatorError> {
        let mut remaining: BTreeSet<String> = self.buckets.keys().cloned().collect();
        let mut budget = total_memory;
        let mut pass = 0;

        while !remaining.is_empty() {
            pass += 1;
            let weight: f64 = remaining
                .iter()
                .filter_map(|name| self.buckets.get(name))
                .map(Bucket::weight)
                .sum();

            let mut unpinned = BTreeSet::new();
            let mut exact_shares = BTreeMap::new();
            let mut pinned = Size::ZERO;

            for (name, bucket) in self
                .buckets
                .iter_mut()
                .filter(|(name, _)| remaining.contains(name.as_str()))
            {
                let tentative = budget.scale(bucket.weight() / weight);
                if bucket.range().contains(tentative) {
                    bucket.set_size(tentative);
                    unpinned.insert(name.clone());
                    exact_shares.insert(name.clone(), budget.bytes() as f64 * bucket.weight() / weight);
                } else {
                    let bound = bucket.range().constrain(tentative);
                    tracing::debug!("pass {pass}: {name} pinned to {bound} (share {tentative})");
                    bucket.set_size(bound);
                    pinned = pinned + bound;
                }
            }

            budget = budget - pinned;
            if budget < Size::ZERO {
                return Err(AllocatorError::memory_exceeded(budget));
            }

            let settled = unpinned.len() == remaining.len();
            remaining = unpinned;
            if settled {
                self.trim_rounding_overrun(&exact_shares, budget)?;
                break;
            }
        }

        tracing::debug!("balanced in {pass} passes, {budget} left for proportional buckets");
        Ok(())
    }

    /// Takes back the bytes that half-up rounding of the final shares
    /// added beyond `budget`.
    ///
    /// Buckets that were rounded up the most give up one byte each first,
    /// as long as the smaller size stays inside their range.
    fn trim_rounding_overrun(
        &mut self,
        exact_shares: &BTreeMap<String, f64>,
        budget: Size,
    ) -> Result<(), AllocatorError> {
        let allocated: i64 = exact_shares
            .keys()
            .filter_map(|name| self.buckets.get(name).and_then(Bucket::size))
            .map(|s| s.bytes())
            .sum();
        let mut overrun = allocated - budget.bytes();
        if overrun <= 0 {
            return Ok(());
        }
        tracing::debug!("trimming {overrun} bytes of rounding overrun");

        let mut candidates: Vec<(&String, f64)> = exact_shares
            .iter()
            .filter_map(|(name, exact)| {
                let size = self.buckets.get(name)?.size()?;
                Some((name, size.bytes() as f64 - exact))
            })
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        while overrun > 0 {
            let before = overrun;
            for (name, _) in &candidates {
                if overrun == 0 {
                    break;
                }
                let Some(bucket) = self.buckets.get_mut(name.as_str()) else {
                    continue;
                };
                let Some(size) = bucket.size() else {
                    continue;
                };
                let smaller = size - Size::from_bytes(1);
                if bucket.range().contains(smaller) {
                    bucket.set_size(smaller);
                    overrun -= 1;
                }
            }
            if overrun == before {
                return Err(AllocatorError::memory_exceeded(Size::from_bytes(-overrun)));
            }
        }
        Ok(())
    }

    fn allocation_error(&self, source: AllocatorError) -> AllocatorError {
        let constraints = self
            .original_sizes
            .iter()
            .map(|(name, range)| format!("{name}:{range}"))
            .collect::<Vec<_>>()
            .join(", ");
        AllocatorError::Allocation {
            constraints: format!("[{constraints}]"),
            source: Box::new(source),
        }
    }

    /// The caller's size constraints, as given to [`Allocator::new`].
    pub fn original_sizes(&self) -> &BTreeMap<String, Range> {
        &self.original_sizes
    }

    /// Looks up a bucket by name.
    pub fn bucket(&self, name: &str) -> Option<&Bucket> {
        self.buckets.get(name)
    }

    /// Iterates the buckets in name order.
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.values()
    }

    /// The assigned size of every sized bucket.
    pub fn sizes(&self) -> BTreeMap<String, Size> {
        self.buckets
            .iter()
            .filter_map(|(name, b)| b.size().map(|s| (name.clone(), s)))
            .collect()
    }

    /// Renders the switches for every sized bucket `table` knows, in table
    /// order.
    pub fn switches(&self, table: &SwitchTable) -> Vec<String> {
        table
            .entries()
            .filter_map(|e| {
                self.buckets
                    .get(e.bucket)
                    .and_then(Bucket::size)
                    .map(|s| table.apply(e.bucket, s))
            })
            .flatten()
            .collect()
    }

    /// Warnings raised by the last successful balance.
    pub fn warnings(&self) -> &[AllocationWarning] {
        &self.warnings
    }

    /// Returns a human-readable summary of the bucket sizes.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .buckets
            .values()
            .map(|b| match b.size() {
                Some(s) => format!("{}={s}", b.name()),
                None => format!("{}=unset", b.name()),
            })
            .collect();
        format!(
            "Allocation: {} buckets ({}), {} warnings",
            self.buckets.len(),
            parts.join(", "),
            self.warnings.len(),
        )
    }
}
