// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Named, weighted, range-constrained allocation slots.

use crate::AllocatorError;
use memory_model::{Range, Size};
use std::fmt;

/// Name of the per-thread stack bucket.
pub const STACK: &str = "stack";

/// Name of the native (unswitched, left-over) memory bucket.
pub const NATIVE: &str = "native";

/// The JRE's standard thread stack size, used when `stack` has no floor.
pub const JRE_DEFAULT_STACK_SIZE: Size = Size::from_mb(1);

/// A memory bucket: a named slot the allocator assigns a [`Size`] to.
///
/// The `weight` is the bucket's relative claim on the budget; the `range`
/// bounds what it may be assigned. The size stays unset until the
/// allocator balances.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    name: String,
    range: Range,
    weight: f64,
    size: Option<Size>,
}

impl Bucket {
    /// Creates a bucket. The name is trimmed and must not be blank; the
    /// weight must be strictly positive.
    pub fn new(name: &str, weight: f64, range: Range) -> Result<Self, AllocatorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AllocatorError::BlankName);
        }
        if !(weight.is_finite() && weight > 0.0) {
            return Err(AllocatorError::NonPositiveWeight {
                bucket: name.to_string(),
                weight,
            });
        }
        Ok(Self {
            name: name.to_string(),
            range,
            weight,
            size: None,
        })
    }

    /// The bucket name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The permissible range of sizes.
    pub fn range(&self) -> Range {
        self.range
    }

    /// The relative weight of this bucket.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The assigned size, if the bucket has been balanced.
    pub fn size(&self) -> Option<Size> {
        self.size
    }

    /// Assigns the bucket size.
    pub fn set_size(&mut self, size: Size) {
        self.size = Some(size);
    }

    /// Returns an unsized copy of this bucket constrained by `range`.
    pub fn with_range(&self, range: Range) -> Self {
        Self {
            name: self.name.clone(),
            range,
            weight: self.weight,
            size: None,
        }
    }

    /// Returns `true` for the per-thread `stack` bucket.
    pub fn is_stack(&self) -> bool {
        self.name == STACK
    }

    /// The default size of this bucket.
    ///
    /// For `stack` this is the floor of the range, or
    /// [`JRE_DEFAULT_STACK_SIZE`] if the floor is zero. Other buckets have
    /// no default and return zero.
    pub fn default_size(&self) -> Size {
        if !self.is_stack() {
            return Size::ZERO;
        }
        let floor = self.range.floor();
        if floor.is_zero() {
            JRE_DEFAULT_STACK_SIZE
        } else {
            floor
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = match self.size {
            Some(s) => s.to_string(),
            None => "unset".to_string(),
        };
        write!(
            f,
            "Bucket{{name: {}, size: {}, range: {}, weight: {}}}",
            self.name, size, self.range, self.weight
        )
    }
}
