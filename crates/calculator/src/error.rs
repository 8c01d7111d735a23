// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

/// Errors that can occur while calculating JVM memory switches.
#[derive(Debug, thiserror::Error)]
pub enum CalculatorError {
    /// A size or range could not be parsed.
    #[error("size error: {0}")]
    SizeError(#[from] memory_model::SizeError),

    /// The allocator rejected the buckets or could not balance them.
    #[error("allocation error: {0}")]
    AllocatorError(#[from] bucket_allocator::AllocatorError),

    /// Memory limit detection failed.
    #[error("memory detection error: {0}")]
    DetectError(#[from] host_memory::DetectError),

    /// A JVM option carried a value that is not a size.
    #[error("invalid JVM option '{option}': {source}")]
    InvalidOption {
        option: String,
        #[source]
        source: memory_model::SizeError,
    },

    /// Head-room and fixed sizes leave too little to balance.
    #[error("fixed memory ({fixed}) leaves less than 1K of the {available} available for balancing")]
    InsufficientMemory {
        fixed: memory_model::Size,
        available: memory_model::Size,
    },

    /// A JRE version string could not be parsed.
    #[error("invalid JRE version '{0}': expected up to three numeric components, e.g. 1.8.0")]
    InvalidVersion(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
