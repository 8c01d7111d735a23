// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Inclusive ranges of [`Size`] values.
//!
//! A [`Range`] is either bounded (`lo..hi`) or unbounded above (`lo..`).
//! Ranges are the constraints the allocator must respect for each bucket;
//! a degenerate range (`lo == hi`) pins a bucket to an exact value.

use crate::{Size, SizeError};
use std::fmt;

/// An inclusive range of memory sizes, optionally unbounded above.
///
/// # Syntax
/// ```text
/// range ::= limit | lower '..' upper
/// lower ::= '' | limit          (default 0)
/// upper ::= '' | limit          (default unbounded)
/// ```
///
/// # Examples
/// ```
/// use memory_model::{Range, Size};
///
/// let r = Range::parse("64m..1g").unwrap();
/// assert!(r.contains(Size::from_mb(128)));
/// assert_eq!(r.constrain(Size::from_gb(2)), Size::from_gb(1));
///
/// let pinned = Range::parse("512m").unwrap();
/// assert!(pinned.is_degenerate());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    floor: Size,
    ceiling: Option<Size>,
}

impl Range {
    /// Creates a bounded range. Fails if `floor > ceiling`.
    pub fn bounded(floor: Size, ceiling: Size) -> Result<Self, SizeError> {
        if ceiling.less_than(&floor) {
            return Err(SizeError::InvertedRange {
                lower: floor.bytes(),
                upper: ceiling.bytes(),
            });
        }
        Ok(Self {
            floor,
            ceiling: Some(ceiling),
        })
    }

    /// Creates a range with no upper bound.
    pub const fn at_least(floor: Size) -> Self {
        Self {
            floor,
            ceiling: None,
        }
    }

    /// Creates a degenerate range holding exactly `value`.
    pub const fn exactly(value: Size) -> Self {
        Self {
            floor: value,
            ceiling: Some(value),
        }
    }

    /// The unconstrained range `0..`.
    pub const fn unconstrained() -> Self {
        Self::at_least(Size::ZERO)
    }

    /// Parses a range string such as `"3m..5m"`, `"..5m"`, `"5m.."` or `"3m"`.
    ///
    /// An empty string is the unconstrained range `0..`.
    pub fn parse(s: &str) -> Result<Self, SizeError> {
        let t = s.trim();
        if t.is_empty() {
            return Ok(Self::unconstrained());
        }

        let invalid = |_| SizeError::InvalidRange(t.to_string());
        let bounds: Vec<&str> = t.split("..").map(str::trim).collect();

        match bounds.as_slice() {
            [exact] => Ok(Self::exactly(Size::parse(exact).map_err(invalid)?)),
            [lower, upper] => {
                let floor = if lower.is_empty() {
                    Size::ZERO
                } else {
                    Size::parse(lower).map_err(invalid)?
                };
                if upper.is_empty() {
                    return Ok(Self::at_least(floor));
                }
                let ceiling = Size::parse(upper).map_err(invalid)?;
                Self::bounded(floor, ceiling)
            }
            _ => Err(SizeError::InvalidRange(t.to_string())),
        }
    }

    /// The lower bound.
    pub const fn floor(&self) -> Size {
        self.floor
    }

    /// The upper bound, or `None` if the range is unbounded.
    pub const fn ceiling(&self) -> Option<Size> {
        self.ceiling
    }

    /// Returns `true` if the range has an upper bound.
    pub const fn is_bounded(&self) -> bool {
        self.ceiling.is_some()
    }

    /// Returns `true` if `value` lies within the range (inclusive).
    pub fn contains(&self, value: Size) -> bool {
        value >= self.floor && self.ceiling.map_or(true, |c| value <= c)
    }

    /// Returns `value` if it is in the range, otherwise the nearest bound.
    pub fn constrain(&self, value: Size) -> Size {
        if value < self.floor {
            return self.floor;
        }
        match self.ceiling {
            Some(c) if c < value => c,
            _ => value,
        }
    }

    /// Returns `true` if the range is bounded and both bounds are equal.
    pub fn is_degenerate(&self) -> bool {
        self.ceiling == Some(self.floor)
    }

    /// Returns a new range with both bounds multiplied by `factor`.
    ///
    /// Unbounded ranges stay unbounded. Bounds round per [`Size::scale`].
    pub fn scale(&self, factor: f64) -> Result<Self, SizeError> {
        if factor < 0.0 || factor.is_nan() {
            return Err(SizeError::NegativeScale(factor));
        }
        Ok(Self {
            floor: self.floor.scale(factor),
            ceiling: self.ceiling.map(|c| c.scale(factor)),
        })
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::unconstrained()
    }
}

impl std::str::FromStr for Range {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Range::parse(s)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ceiling {
            Some(c) => write!(f, "{}..{}", self.floor, c),
            None => write!(f, "{}..", self.floor),
        }
    }
}
