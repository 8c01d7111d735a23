// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # calculator
//!
//! Computes the JVM memory switches (`-Xmx`, `-Xss`,
//! `-XX:MaxMetaspaceSize=`, …) that fit a Java process into a given or
//! detected memory limit.
//!
//! # Key Components
//!
//! - [`CalculatorConfig`]: all inputs, loadable from TOML.
//! - [`JvmOptions`]: memory switches the user already set.
//! - [`JreVersion`] / [`MemoryModel`]: permgen before 1.8, metaspace after.
//! - [`Calculator`]: runs the pipeline and returns a [`Calculation`].

pub mod calculator;
pub mod config;
mod error;
pub mod jvm_options;
pub mod version;

pub use calculator::{
    class_metadata_estimate, Calculation, Calculator, CODE_CACHE, DIRECT_MEMORY, FIXED_DEFAULTS, HEAP,
    YOUNG_GENERATION,
};
pub use config::{parse_clauses, parse_percentage, parse_weights, CalculatorConfig};
pub use error::CalculatorError;
pub use jvm_options::JvmOptions;
pub use version::{JreVersion, MemoryModel};
