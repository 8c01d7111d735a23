// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # bucket-allocator
//!
//! Divides a fixed memory budget among named, weighted buckets, each
//! optionally constrained to a [`Range`](memory_model::Range), and renders
//! the result as JVM command-line switches.
//!
//! # Key Components
//!
//! - [`Bucket`]: one memory category with a name, weight, range and (once
//!   balanced) size.
//! - [`Allocator`]: the water-filling balancer. Buckets whose
//!   proportional share falls outside their range are pinned to the
//!   nearest bound; the rest share what is left.
//! - [`SwitchTable`]: the bucket → switch-prefix tables
//!   ([`MAXIMUM_SWITCHES`], [`INITIAL_SWITCHES`], [`ALL_JRE_SWITCHES`]).
//! - [`AllocationWarning`]: advisory checks on a finished allocation.
//!
//! # Example
//! ```
//! use bucket_allocator::{Allocator, ALL_JRE_SWITCHES};
//! use memory_model::Size;
//! use std::collections::BTreeMap;
//!
//! let weights = BTreeMap::from([
//!     ("heap".to_string(), 5.0),
//!     ("permgen".to_string(), 3.0),
//!     ("stack".to_string(), 1.0),
//!     ("native".to_string(), 1.0),
//! ]);
//!
//! let mut allocator = Allocator::new(BTreeMap::new(), weights).unwrap();
//! allocator.balance(Size::from_mb(1024), 0).unwrap();
//! assert_eq!(
//!     allocator.switches(&ALL_JRE_SWITCHES),
//!     vec!["-Xmx512M", "-Xms512M", "-Xss1M", "-XX:MaxPermSize=314572K", "-XX:PermSize=314572K"],
//! );
//! ```

pub mod allocator;
pub mod bucket;
mod error;
pub mod initials;
pub mod switches;
pub mod warnings;

pub use allocator::{Allocator, MIN_TOTAL_MEMORY};
pub use bucket::{Bucket, JRE_DEFAULT_STACK_SIZE, NATIVE, STACK};
pub use error::AllocatorError;
pub use initials::{initial_minimum, initial_switches, InitialSwitches};
pub use switches::{SwitchEntry, SwitchTable, ALL_JRE_SWITCHES, INITIAL_SWITCHES, MAXIMUM_SWITCHES};
pub use warnings::AllocationWarning;
