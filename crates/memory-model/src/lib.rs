// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-model
//!
//! Value types for describing JVM memory quantities.
//!
//! # Key Components
//!
//! - [`Size`]: a signed byte count with human-readable parsing
//!   (`"512M"`, `"2g"`, `"1048576"`) and exact-unit formatting.
//! - [`Range`]: an inclusive `lo..hi` or `lo..` interval of sizes used to
//!   constrain what the allocator may assign to a bucket.
//!
//! Both types are immutable `Copy` values; every operation returns a new
//! value.
//!
//! # Example
//! ```
//! use memory_model::{Range, Size};
//!
//! let heap = Range::parse("128m..1g").unwrap();
//! let budget = Size::parse("2G").unwrap();
//! assert_eq!(heap.constrain(budget).to_string(), "1G");
//! ```

mod error;
mod range;
mod size;

pub use error::SizeError;
pub use range::Range;
pub use size::{Size, GIBI, KIBI, MEBI, TEBI};
