// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for size and range parsing.

/// Errors that can occur when parsing or transforming sizes and ranges.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SizeError {
    /// The size string was empty after trimming.
    #[error("memory size string cannot be empty")]
    Empty,

    /// The size string does not match `<integer>[b|k|m|g|t]`.
    #[error("invalid memory size string '{0}': expected an integer followed by an optional unit (B, K, M, G, T)")]
    InvalidSize(String),

    /// The size does not fit in a signed 64-bit byte count.
    #[error("memory size '{0}' overflows a 64-bit byte count")]
    Overflow(String),

    /// The range string is syntactically invalid.
    #[error("invalid string range '{0}'")]
    InvalidRange(String),

    /// A bounded range whose lower bound exceeds its upper bound.
    #[error("invalid bounded range: lower ({lower}) is higher than upper ({upper})")]
    InvertedRange { lower: i64, upper: i64 },

    /// A range was scaled by a negative factor.
    #[error("cannot scale a range by a negative factor ({0})")]
    NegativeScale(f64),
}
