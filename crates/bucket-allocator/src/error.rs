// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for bucket construction and balancing.

use memory_model::{Size, SizeError};

/// Errors that can occur while building buckets or balancing an allocator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocatorError {
    /// A bucket was given a blank name.
    #[error("bucket name must not be blank")]
    BlankName,

    /// A bucket was given a zero, negative or non-finite weight.
    #[error("weight ({weight}) for bucket {bucket} must be positive")]
    NonPositiveWeight { bucket: String, weight: f64 },

    /// A size constraint names a bucket that has no weight.
    #[error("size constraint {range} given for bucket '{bucket}' which has no weight")]
    UnweightedBucket { bucket: String, range: String },

    /// The total memory budget is below one kilobyte.
    #[error("total memory ({0} bytes) is less than 1K")]
    TotalTooSmall(i64),

    /// Pinned buckets consumed more than the memory budget.
    #[error("memory exceeded: pinned allocations overrun the budget by {overrun} bytes")]
    MemoryExceeded { overrun: i64 },

    /// A bucket ended balancing with nothing allocated to it.
    #[error("insufficient memory: no memory was allocated to bucket '{0}'")]
    ZeroAllocation(String),

    /// Balancing failed; carries the caller's constraints for diagnosis.
    #[error("cannot balance memory within the configured sizes {constraints}: {source}")]
    Allocation {
        constraints: String,
        #[source]
        source: Box<AllocatorError>,
    },

    /// A size or range transformation failed.
    #[error("size error: {0}")]
    Size(#[from] SizeError),
}

impl AllocatorError {
    pub(crate) fn memory_exceeded(remaining: Size) -> Self {
        Self::MemoryExceeded {
            overrun: -remaining.bytes(),
        }
    }
}
