// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

/// Errors from memory limit detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// Failed to read a cgroup or procfs file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// A file was read but its content could not be understood.
    #[error("failed to parse value from {path}: {detail}")]
    ParseError { path: String, detail: String },

    /// None of the probed files reported a memory limit.
    #[error("no memory limit found; tried {tried}")]
    NotAvailable { tried: String },
}
